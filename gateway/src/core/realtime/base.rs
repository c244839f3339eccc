//! Error types shared by the signaling relay.
//!
//! Every variant is terminal for the negotiation attempt; nothing here is
//! retried.

use thiserror::Error;

/// Errors that can occur while negotiating an SDP answer.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Server-side deployment problem (e.g. missing API key)
    #[error("{0}")]
    Configuration(String),

    /// Malformed or non-audio offer, rejected before any upstream call
    #[error("{0}")]
    ClientInput(String),

    /// Upstream answered with a non-success status
    #[error("Upstream negotiation failed with status {status}")]
    Upstream {
        /// HTTP status returned by the upstream endpoint
        status: u16,
        /// Parsed JSON error body, or the raw text when it is not JSON
        detail: serde_json::Value,
    },

    /// Network failure reaching the upstream endpoint
    #[error("Transport error: {0}")]
    Transport(String),
}

impl SignalingError {
    /// Missing credential error with the message clients see.
    pub fn missing_credential() -> Self {
        SignalingError::Configuration("Missing OPENAI_API_KEY".to_string())
    }

    /// Offer without an audio section.
    pub fn missing_audio_section() -> Self {
        SignalingError::ClientInput("Offer did not have an audio media section.".to_string())
    }
}

impl From<reqwest::Error> for SignalingError {
    fn from(err: reqwest::Error) -> Self {
        SignalingError::Transport(err.to_string())
    }
}

/// Result type for signaling operations.
pub type SignalingResult<T> = Result<T, SignalingError>;
