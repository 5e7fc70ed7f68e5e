//! Upstream weather statistics endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::error;

use super::{error_body, method_not_allowed};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/weather", get(get_weather).fallback(method_not_allowed))
}

/// GET /api/weather - Proxy the upstream weather statistics
async fn get_weather(State(state): State<AppState>) -> impl IntoResponse {
    match state.upstream.fetch_weather_stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            error!("Error fetching weather stats: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
