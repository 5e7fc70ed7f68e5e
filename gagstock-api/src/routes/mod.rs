//! API route definitions

mod database;
mod health;
mod stock;
mod weather;

use axum::{http::StatusCode, response::Json, Router};
use serde_json::{json, Value};

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(database::routes())
        .merge(stock::routes())
        .merge(weather::routes())
        .merge(health::routes())
}

/// Fallback for any method other than the route's GET
async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

fn error_body(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}
