//! Signaling relay for the OpenAI Realtime WebRTC endpoint.
//!
//! The relay holds the API key so the browser never sees it. Each call to
//! [`RealtimeRelay::negotiate`] is a single, stateless HTTP round trip:
//!
//! - Endpoint: `POST https://api.openai.com/v1/realtime?model=<model>`
//! - Request body: raw SDP offer (`application/sdp`)
//! - Response body: raw SDP answer, or a JSON error payload
//!
//! # Example
//!
//! ```rust,ignore
//! use hotline_gateway::core::realtime::{RealtimeRelay, OPENAI_REALTIME_URL};
//!
//! let relay = RealtimeRelay::new(OPENAI_REALTIME_URL, Some("sk-...".into()), None, None);
//! let answer = relay.negotiate(&offer_json, Some("gpt-realtime"), None).await?;
//! println!("model={} bytes={}", answer.model, answer.sdp.len());
//! ```

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use super::base::{SignalingError, SignalingResult};
use super::config::{OPENAI_BETA_HEADER, OpenAIRealtimeModel};
use super::resolver::{SessionDefaults, resolve_model, resolve_voice, server_defaults};
use super::sdp::{has_audio_section, sanitize_sdp};

/// MIME type of SDP bodies in both directions.
pub const SDP_CONTENT_TYPE: &str = "application/sdp";

/// Successful negotiation result.
#[derive(Debug, Clone)]
pub struct NegotiatedAnswer {
    /// Upstream answer, verbatim
    pub sdp: Bytes,
    /// Model the offer was negotiated with
    pub model: OpenAIRealtimeModel,
    /// Voice label resolved for this call
    pub voice: String,
}

/// Stateless SDP relay towards the realtime negotiation endpoint.
pub struct RealtimeRelay {
    /// Shared HTTP client
    client: reqwest::Client,
    /// Negotiation endpoint (without query string)
    endpoint: String,
    /// Server-side credential; `None` makes every negotiation fail
    api_key: Option<String>,
    /// Environment model override (validated against the allow-list per call)
    env_model: Option<String>,
    /// Environment voice override
    env_voice: Option<String>,
}

impl Drop for RealtimeRelay {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.api_key {
            key.zeroize();
        }
    }
}

impl RealtimeRelay {
    /// Create a relay with a default HTTP client.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        env_model: Option<String>,
        env_voice: Option<String>,
    ) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, api_key, env_model, env_voice)
    }

    /// Create a relay around an existing HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        env_model: Option<String>,
        env_voice: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            env_model,
            env_voice,
        }
    }

    /// Negotiation endpoint this relay forwards to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether a credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Defaults served by the configuration endpoint. Never needs the key.
    pub fn session_defaults(&self) -> SessionDefaults {
        server_defaults(self.env_model.as_deref(), self.env_voice.as_deref())
    }

    /// Build the upstream URL for a given model.
    pub fn negotiation_url(&self, model: OpenAIRealtimeModel) -> SignalingResult<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| {
            SignalingError::Configuration(format!(
                "Invalid realtime endpoint '{}': {}",
                self.endpoint, e
            ))
        })?;
        url.query_pairs_mut().append_pair("model", model.as_str());
        Ok(url)
    }

    /// Forward an offer upstream and return the answer.
    ///
    /// `offer` is the raw JSON value of the request's `sdp` field; anything
    /// that is not a string is rejected as a client error.
    pub async fn negotiate(
        &self,
        offer: &Value,
        model_hint: Option<&str>,
        voice_hint: Option<&str>,
    ) -> SignalingResult<NegotiatedAnswer> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("Negotiation attempted without OPENAI_API_KEY configured");
            return Err(SignalingError::missing_credential());
        };

        let model = resolve_model(model_hint, self.env_model.as_deref());
        let voice = resolve_voice(voice_hint, self.env_voice.as_deref());

        let sdp = sanitize_sdp(offer);
        if sdp.is_empty() || !has_audio_section(&sdp) {
            warn!(
                offer_len = sdp.len(),
                "Rejecting offer without an audio media section"
            );
            return Err(SignalingError::missing_audio_section());
        }

        info!(model = %model, voice = %voice, "Using realtime model");

        let url = self.negotiation_url(model)?;
        debug!(url = %url, offer_len = sdp.len(), "Forwarding SDP offer");

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .header("OpenAI-Beta", OPENAI_BETA_HEADER)
            .header(reqwest::header::CONTENT_TYPE, SDP_CONTENT_TYPE)
            .header(reqwest::header::ACCEPT, SDP_CONTENT_TYPE)
            .body(sdp)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach realtime endpoint: {}", e);
                SignalingError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            let detail = parse_error_detail(text);
            error!(status = status.as_u16(), detail = %detail, "Upstream rejected SDP offer");
            return Err(SignalingError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let answer = response.bytes().await?;
        debug!(answer_len = answer.len(), "Received SDP answer");

        Ok(NegotiatedAnswer {
            sdp: answer,
            model,
            voice,
        })
    }
}

/// Best-effort structured error: JSON when it parses, raw text otherwise.
pub fn parse_error_detail(text: String) -> Value {
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}
