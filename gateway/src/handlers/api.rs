use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Health check endpoint
///
/// Returns `{"status": "OK"}` without touching any upstream.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "OK" }))
}
