//! Service description and health handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::PERFORMANCE_EXAMPLE;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    path: &'static str,
    description: &'static str,
    example: &'static str,
}

#[derive(Serialize)]
pub struct IndexResponse {
    name: &'static str,
    version: &'static str,
    organization: String,
    endpoints: Vec<EndpointInfo>,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        name: "PRFormance",
        version: env!("CARGO_PKG_VERSION"),
        organization: state.aggregation.organization().to_string(),
        endpoints: vec![
            EndpointInfo {
                path: "/performance",
                description: "Ranked contributor performance for a date range",
                example: PERFORMANCE_EXAMPLE,
            },
            EndpointInfo {
                path: "/health",
                description: "Liveness check",
                example: "/health",
            },
        ],
    })
}
