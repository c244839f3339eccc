//! Request bodies for the signaling endpoints

use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /api/sdp`.
///
/// Fields are kept as raw JSON so that a wrong type degrades the same way as
/// a missing value: a non-string `sdp` is rejected as an offer without audio,
/// a non-string `model` or `voice` falls back to the server's choice.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NegotiateRequest {
    pub sdp: Value,
    pub voice: Option<Value>,
    pub model: Option<Value>,
}

impl NegotiateRequest {
    /// Client model hint, if it is a string.
    pub fn model_hint(&self) -> Option<&str> {
        self.model.as_ref().and_then(Value::as_str)
    }

    /// Client voice hint, if it is a string.
    pub fn voice_hint(&self) -> Option<&str> {
        self.voice.as_ref().and_then(Value::as_str)
    }
}
