//! Health check handlers and response types.

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub relay: String,
    pub tracked_submissions: usize,
}

/// Liveness probe - process is running.
pub async fn liveness_check(_state: Arc<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - configuration loaded and routes serving.
///
/// The relay is deliberately not probed: its only surface is the send
/// endpoint, and probing it would deliver mail.
pub async fn readiness_check(_state: Arc<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ready" })),
    )
}

/// Health summary: relay configuration and status store occupancy.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    let relay = if state.config.relay.api_base.is_empty() {
        "not_configured"
    } else {
        "configured"
    };

    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        relay: relay.to_string(),
        tracked_submissions: state.status_store.len().await,
    };

    (StatusCode::OK, Json(response))
}
