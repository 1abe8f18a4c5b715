//! Application services
//!
//! Business logic orchestration that uses domain ports.

pub mod accumulator;
pub mod aggregation_service;
pub mod batch;
pub mod branch_estimator;
pub mod collector;
pub mod period;
pub mod rate_limit;
pub mod score_weights;
pub mod scoring;

pub use accumulator::Accumulator;
pub use aggregation_service::{AggregationService, AggregationSettings};
pub use branch_estimator::{BranchEstimator, BranchEstimatorSettings, EstimatedBranch};
pub use collector::{CollectedRepository, CollectorSettings, RepositoryCollector};
pub use period::Preset;
pub use rate_limit::RateLimitBudget;
pub use score_weights::ScoreWeights;
pub use scoring::{rank, score};
