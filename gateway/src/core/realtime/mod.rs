//! OpenAI Realtime API signaling.
//!
//! This module covers everything the server side needs to put a browser on a
//! WebRTC call with the Realtime API:
//!
//! - `config` - model allow-list, default voice, endpoint constants
//! - `resolver` - client / environment / default precedence for model and voice
//! - `sdp` - offer sanitation and audio-section check
//! - `relay` - one-shot SDP offer/answer exchange with the upstream endpoint
//! - `messages` - data-channel control events (session.update, response.create)
//!
//! # Example
//!
//! ```rust,ignore
//! use hotline_gateway::core::realtime::{RealtimeRelay, OPENAI_REALTIME_URL};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let relay = RealtimeRelay::new(OPENAI_REALTIME_URL, Some("sk-...".into()), None, None);
//!     let answer = relay
//!         .negotiate(&json!("v=0\r\nm=audio 9 UDP/TLS/RTP/SAVPF 0\r\n"), None, None)
//!         .await
//!         .unwrap();
//!     println!("{}", String::from_utf8_lossy(&answer.sdp));
//! }
//! ```

mod base;
mod config;
mod messages;
mod relay;
mod resolver;
mod sdp;

pub use base::{SignalingError, SignalingResult};
pub use config::{
    DEFAULT_VOICE, Modality, OPENAI_BETA_HEADER, OPENAI_REALTIME_URL, OpenAIRealtimeModel,
};
pub use messages::{ClientEvent, ResponseConfig, ServerEventEnvelope, SessionConfig, TurnDetection};
pub use relay::{NegotiatedAnswer, RealtimeRelay, SDP_CONTENT_TYPE, parse_error_detail};
pub use resolver::{SessionDefaults, clean_value, resolve_model, resolve_voice, server_defaults};
pub use sdp::{AUDIO_MEDIA_MARKER, has_audio_section, sanitize_sdp, sanitize_sdp_str};
