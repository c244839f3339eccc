//! Realtime signaling route configuration
//!
//! This module configures the endpoints a browser needs to open a WebRTC
//! call with the OpenAI Realtime API through this gateway.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::realtime::{get_config, negotiate_sdp};
use crate::state::AppState;
use std::sync::Arc;

/// Create the Realtime signaling router
///
/// # Endpoints
///
/// `GET /api/config` - model and voice the relay defaults to
///
/// `POST /api/sdp` - SDP offer/answer exchange
///
/// # Example
///
/// ```json
/// // Client posts its offer
/// {"sdp": "v=0\r\n...m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n...", "model": "gpt-realtime", "voice": "ash"}
///
/// // Server answers with Content-Type: application/sdp
/// v=0
/// ...
/// ```
pub fn create_realtime_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/config", get(get_config))
        .route("/api/sdp", post(negotiate_sdp))
        .layer(TraceLayer::new_for_http())
}
