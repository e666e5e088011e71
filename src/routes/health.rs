//! Health check endpoints.
//!
//! `GET /` is the liveness view: version, commit and the aggregate heartbeat.
//! `GET /health` adds the per-dependency breakdown. Both always answer 200;
//! an unreachable dependency shows up as `UNHEALTHY` in the body.

use axum::{extract::State, Json};

use crate::health::{DetailedHealthStatus, SimpleHealthStatus};
use crate::state::AppState;

/// Simple health check handler.
pub async fn simple(State(state): State<AppState>) -> Json<SimpleHealthStatus> {
    Json(state.simple_health_checker().check().await)
}

/// Detailed health check handler with dependency checks.
pub async fn detailed(State(state): State<AppState>) -> Json<DetailedHealthStatus> {
    Json(state.detailed_health_checker().check().await)
}
