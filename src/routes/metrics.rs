//! Prometheus scrape endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use http::header::CONTENT_TYPE;

use crate::error::AppError;
use crate::state::AppState;

/// Render all collected metrics in the text exposition format.
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state
        .metrics
        .gather()
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;
    Ok(([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
