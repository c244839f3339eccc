use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::core::realtime::SignalingError;

/// Errors surfaced by HTTP handlers.
///
/// Every response body has the shape `{"error": ...}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Signaling(#[from] SignalingError),

    /// Body could not be parsed as the expected JSON
    #[error("{0}")]
    BadRequest(String),
}

/// Result type for handlers.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Signaling(SignalingError::Configuration(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Signaling(SignalingError::ClientInput(_)) => StatusCode::BAD_REQUEST,
            AppError::Signaling(SignalingError::Upstream { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Signaling(SignalingError::Transport(_)) => StatusCode::BAD_GATEWAY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Value of the `error` field.
    ///
    /// Upstream failures carry the upstream body (parsed JSON or raw text).
    pub fn detail(&self) -> Value {
        match self {
            AppError::Signaling(SignalingError::Upstream { detail, .. }) => detail.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.detail() }))).into_response()
    }
}
