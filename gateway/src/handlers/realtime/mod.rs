//! Realtime signaling handlers
//!
//! The browser never sees the OpenAI key. It fetches session defaults, then
//! posts its SDP offer here and receives the upstream answer verbatim.
//!
//! # Endpoints
//!
//! - **GET /api/config**: `{"model": ..., "voice": ...}` the relay would use
//!   when the client pins neither. Works without a configured key.
//! - **POST /api/sdp**: body `{"sdp": ..., "voice"?: ..., "model"?: ...}`.
//!   Responds `200 application/sdp` with the answer, or `{"error": ...}`
//!   with 400 (bad offer), 500 (missing key, upstream rejection) or 502
//!   (upstream unreachable).

mod handler;
pub mod messages;

pub use handler::{get_config, negotiate_sdp};
