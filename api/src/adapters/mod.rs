//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod cache;
pub mod github;

pub use cache::{CachedSource, ResponseCache};
pub use github::GitHubClient;
