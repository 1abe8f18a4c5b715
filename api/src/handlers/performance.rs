//! Performance report handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::domain::entities::{is_iso_date, Report};
use crate::error::AppError;
use crate::AppState;

/// Query params for the performance report
#[derive(Debug, Deserialize)]
pub struct PerformanceQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// GET /performance?startDate=YYYY-MM-DD&endDate=YYYY-MM-DD
pub async fn get_performance(
    State(state): State<AppState>,
    Query(query): Query<PerformanceQuery>,
) -> Result<Json<Report>, AppError> {
    let (Some(start), Some(end)) = (
        query.start_date.filter(|s| !s.is_empty()),
        query.end_date.filter(|s| !s.is_empty()),
    ) else {
        tracing::warn!("Performance request without startDate/endDate");
        return Err(AppError::bad_request("startDate and endDate are required"));
    };

    if !is_iso_date(&start) || !is_iso_date(&end) {
        tracing::warn!(start = %start, end = %end, "Performance request with malformed dates");
        return Err(AppError::bad_request("Dates must use the YYYY-MM-DD format"));
    }

    tracing::info!(start = %start, end = %end, "Computing performance report");
    let report = state.aggregation.run(&start, &end).await?;
    tracing::info!(developers = report.developers.len(), "Performance report ready");

    Ok(Json(report))
}
