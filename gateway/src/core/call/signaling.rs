//! Client side of the SDP relay.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use super::base::{CallError, CallResult};
use crate::core::realtime::SessionDefaults;

/// Path of the offer/answer endpoint.
pub const SDP_PATH: &str = "/api/sdp";

/// Path of the configuration endpoint.
pub const CONFIG_PATH: &str = "/api/config";

/// Offer posted to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferRequest {
    pub sdp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Exchanges an offer for an answer through the relay.
#[async_trait]
pub trait SignalingClient: Send + Sync {
    /// Post the offer and return the raw SDP answer.
    async fn exchange(&self, offer: &OfferRequest) -> CallResult<String>;

    /// Model and voice the relay would pick when the client pins neither.
    async fn session_defaults(&self) -> CallResult<SessionDefaults>;
}

/// `SignalingClient` talking to the gateway over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSignalingClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSignalingClient {
    /// Create a client for the gateway at `base_url`.
    pub fn new(base_url: &str) -> CallResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> CallResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            CallError::SignalingTransport(format!("invalid gateway URL '{base_url}': {e}"))
        })?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> CallResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CallError::SignalingTransport(format!("invalid endpoint {path}: {e}")))
    }
}

#[async_trait]
impl SignalingClient for HttpSignalingClient {
    async fn exchange(&self, offer: &OfferRequest) -> CallResult<String> {
        let url = self.endpoint(SDP_PATH)?;
        debug!(%url, model = ?offer.model, voice = ?offer.voice, "Posting SDP offer");

        let response = self.client.post(url).json(offer).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or_else(|_| json!({}));
            warn!(status = status.as_u16(), %body, "Relay rejected SDP offer");
            return Err(CallError::SignalingRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }

    async fn session_defaults(&self) -> CallResult<SessionDefaults> {
        let url = self.endpoint(CONFIG_PATH)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or_else(|_| json!({}));
            return Err(CallError::SignalingRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<SessionDefaults>().await?)
    }
}
