//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: contribution records, profiles and reports
//! - `ports`: the source API trait and the raw records it returns

pub mod entities;
pub mod ports;
