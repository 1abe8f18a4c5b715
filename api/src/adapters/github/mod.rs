//! GitHub adapter
//!
//! Implementation of the source API port over the GitHub REST API.

pub mod client;

pub use client::GitHubClient;
