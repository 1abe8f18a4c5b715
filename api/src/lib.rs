//! PRFormance
//!
//! Aggregates the contributions of every member of a GitHub organization
//! over a date range and ranks them by a weighted score.
//! Uses hexagonal (ports & adapters) architecture: the aggregation core
//! only talks to the [`SourceApi`] port.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;

#[cfg(test)]
mod test_utils;

use adapters::{CachedSource, GitHubClient, ResponseCache};
use app::{AggregationService, AggregationSettings, RateLimitBudget};
use config::Config;
use domain::ports::SourceApi;
use error::SourceError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregation: Arc<AggregationService<dyn SourceApi>>,
}

/// Wire the GitHub client, response cache and rate-limit budget into an aggregation service
pub fn build_service(config: &Config) -> Result<AggregationService<dyn SourceApi>, SourceError> {
    let budget = Arc::new(RateLimitBudget::new(
        config.rate_limit_check_interval,
        config.rate_limit_max_wait,
    ));

    let client = GitHubClient::new(
        &config.github_api_url,
        config.github_token.as_deref(),
        config.github_org.clone(),
        Arc::clone(&budget),
    )?;
    if config.github_token.is_none() {
        tracing::warn!("GITHUB_TOKEN is not set, requests are unauthenticated and heavily rate limited");
    }

    let cache = ResponseCache::new(config.cache_ttl, config.cache_enabled);
    let source: Arc<dyn SourceApi> = Arc::new(CachedSource::new(client, cache));

    Ok(AggregationService::new(
        source,
        budget,
        AggregationSettings::from_config(config),
    ))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/performance", get(handlers::get_performance))
        .route("/api/developers/performance", get(handlers::get_performance))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
