//! Signaling relay handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::core::realtime::{SDP_CONTENT_TYPE, SessionDefaults};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

use super::messages::NegotiateRequest;

/// Session defaults handler
///
/// Returns the model and voice the relay resolves when a client pins
/// neither. Never requires the API key.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SessionDefaults> {
    Json(state.relay.session_defaults())
}

/// SDP offer/answer handler
///
/// Forwards the client's offer to the Realtime API and returns the raw SDP
/// answer. The upstream call is made at most once per request.
///
/// # Arguments
/// * `state` - Application state holding the relay
/// * `payload` - JSON body `{sdp, voice?, model?}`
///
/// # Returns
/// * `200 application/sdp` with the answer on success
/// * `{"error": ...}` JSON otherwise
pub async fn negotiate_sdp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NegotiateRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejecting malformed SDP request body");
        AppError::BadRequest(rejection.body_text())
    })?;

    let answer = state
        .relay
        .negotiate(&request.sdp, request.model_hint(), request.voice_hint())
        .await?;

    info!(
        model = %answer.model,
        voice = %answer.voice,
        answer_len = answer.sdp.len(),
        "SDP negotiation completed"
    );

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, SDP_CONTENT_TYPE)],
        answer.sdp,
    )
        .into_response())
}
