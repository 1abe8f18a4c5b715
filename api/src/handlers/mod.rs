//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod meta;
pub mod performance;

pub use meta::{health, index};
pub use performance::get_performance;
