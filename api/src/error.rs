//! Unified error types for PRFormance
//!
//! This module defines error types for each layer:
//! - `SourceError`: hosting platform (GitHub) client errors
//! - `AggregationError`: core aggregation errors
//! - `ConfigError`: environment configuration errors
//! - `AppError`: HTTP layer errors (wraps aggregation errors for responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Example query shown to callers that send a malformed request
pub const PERFORMANCE_EXAMPLE: &str = "/performance?startDate=2024-01-01&endDate=2024-02-01";

/// Source API client errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized - invalid token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited until {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Rate limit exhausted: reset in {wait_secs}s exceeds the {max_wait_secs}s limit")]
    RateLimitExceeded { wait_secs: u64, max_wait_secs: u64 },

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Core aggregation errors
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exhausted: reset in {wait_secs}s exceeds the {max_wait_secs}s limit")]
    RateLimitExceeded { wait_secs: u64, max_wait_secs: u64 },

    #[error("No repositories found for organization {0}")]
    NoRepositories(String),

    #[error("Source error: {0}")]
    Source(SourceError),
}

impl From<SourceError> for AggregationError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::RateLimitExceeded {
                wait_secs,
                max_wait_secs,
            } => AggregationError::RateLimitExceeded {
                wait_secs,
                max_wait_secs,
            },
            other => AggregationError::Source(other),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// HTTP layer errors - used by handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest {
        message: String,
        example: &'static str,
    },

    #[error("{0}")]
    Aggregation(#[from] AggregationError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            example: PERFORMANCE_EXAMPLE,
        }
    }
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, example) = match &self {
            AppError::BadRequest { message, example } => {
                (StatusCode::BAD_REQUEST, message.clone(), Some(*example))
            }
            AppError::Aggregation(AggregationError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(PERFORMANCE_EXAMPLE),
            ),
            AppError::Aggregation(e) => {
                tracing::error!("Aggregation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { error, example })).into_response()
    }
}
