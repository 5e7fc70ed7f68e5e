//! Categorized upstream stock endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

use super::{error_body, method_not_allowed};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stock", get(get_stock).fallback(method_not_allowed))
}

/// GET /api/stock - Fetch and reshape the upstream all-stock payload
async fn get_stock(State(state): State<AppState>) -> impl IntoResponse {
    match state.upstream.fetch_all_stock().await {
        Ok(stocks) => (StatusCode::OK, Json(stocks)).into_response(),
        Err(_) => {
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch stock data")
                .into_response()
        }
    }
}
