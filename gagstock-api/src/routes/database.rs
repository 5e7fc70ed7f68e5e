//! Local stock database endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use gagstock_providers::{read_database, ProviderError};
use tracing::error;

use super::{error_body, method_not_allowed};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/database", get(get_database).fallback(method_not_allowed))
}

/// GET /api/database - Return the persisted stock document verbatim
async fn get_database(State(state): State<AppState>) -> impl IntoResponse {
    match read_database(state.database_path.as_path()).await {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(ProviderError::NotFound(path)) => {
            error!("Stock database not found at {}", path);
            error_body(StatusCode::NOT_FOUND, "Database.json not found").into_response()
        }
        Err(e) => {
            error!("Error reading Database.json: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read Database.json")
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::build_router;
    use crate::test_support::{body_to_json, state_with};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gagstock-api-{}-{}.json", name, std::process::id()))
    }

    async fn get(path: PathBuf, method: &str) -> axum::response::Response {
        build_router(state_with("http://127.0.0.1:9", path))
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/api/database")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_returns_document() {
        let path = temp_path("ok");
        tokio::fs::write(&path, r#"{"seeds":["Carrot"],"updated":true}"#)
            .await
            .unwrap();

        let response = get(path.clone(), "GET").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_to_json(response.into_body()).await,
            json!({"seeds": ["Carrot"], "updated": true})
        );

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_document_is_404() {
        let response = get(temp_path("missing"), "GET").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_to_json(response.into_body()).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_document_is_500() {
        let path = temp_path("invalid");
        tokio::fs::write(&path, "{oops").await.unwrap();

        let response = get(path.clone(), "GET").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_to_json(response.into_body()).await["error"],
            "Failed to read Database.json"
        );

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let response = get(temp_path("method"), "POST").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_to_json(response.into_body()).await["error"],
            "Method not allowed"
        );
    }
}
