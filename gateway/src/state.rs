use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::realtime::RealtimeRelay;

/// Connect timeout for the upstream SDP exchange. The exchange itself is
/// not bounded.
const UPSTREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub relay: RealtimeRelay,
}

impl AppState {
    pub async fn new(config: ServerConfig) -> Arc<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(UPSTREAM_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build upstream HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            });

        let relay = RealtimeRelay::with_client(
            client,
            config.realtime_url.clone(),
            config.openai_api_key.clone(),
            config.openai_realtime_model.clone(),
            config.openai_realtime_voice.clone(),
        );

        if relay.has_credential() {
            let defaults = relay.session_defaults();
            info!(
                endpoint = relay.endpoint(),
                model = %defaults.model,
                voice = %defaults.voice,
                "Realtime relay ready"
            );
        } else {
            warn!("OPENAI_API_KEY is not set; SDP negotiation will fail until it is configured");
        }

        Arc::new(Self { config, relay })
    }
}
