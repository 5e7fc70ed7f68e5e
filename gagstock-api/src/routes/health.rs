//! Health check endpoints

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::method_not_allowed;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    tracking_enabled: bool,
    active_sessions: usize,
    checked_at: DateTime<Utc>,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        tracking_enabled: state.registry.is_some(),
        active_sessions: state
            .registry
            .as_ref()
            .map(|registry| registry.active_count())
            .unwrap_or(0),
        checked_at: Utc::now(),
    })
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check).fallback(method_not_allowed))
        .route("/health/live", get(liveness))
}
