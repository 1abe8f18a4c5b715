//! Response cache adapter
//!
//! TTL memoization of source listings.

pub mod cached_source;
pub mod response_cache;

pub use cached_source::CachedSource;
pub use response_cache::ResponseCache;
