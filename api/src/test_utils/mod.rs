//! Test utilities
//!
//! An in-memory source API and record fixtures for unit testing.

pub mod fixtures;
pub mod mocks;
