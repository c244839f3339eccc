use tracing::warn;

use super::{ServerConfig, TlsConfig};
use crate::core::realtime::{OpenAIRealtimeModel, clean_value};
use crate::utils::validate_upstream_url;

/// Validate a merged configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_tls(&config.tls)?;
    validate_realtime_url(&config.realtime_url)?;
    validate_rate_limit(
        config.rate_limit_requests_per_second,
        config.rate_limit_burst_size,
    )?;
    check_model_override(config.openai_realtime_model.as_deref());
    Ok(())
}

/// Certificate and key must exist when TLS is enabled.
pub fn validate_tls(tls: &Option<TlsConfig>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(tls) = tls {
        if !tls.cert_path.exists() {
            return Err(format!(
                "TLS certificate file not found: {}",
                tls.cert_path.display()
            )
            .into());
        }
        if !tls.key_path.exists() {
            return Err(format!(
                "TLS private key file not found: {}",
                tls.key_path.display()
            )
            .into());
        }
    }
    Ok(())
}

/// Upstream endpoint must be HTTPS (plain HTTP only for loopback stubs).
pub fn validate_realtime_url(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    validate_upstream_url(url).map_err(|e| format!("Invalid OPENAI_REALTIME_URL '{url}': {e}"))?;
    Ok(())
}

pub fn validate_rate_limit(rps: u32, burst: u32) -> Result<(), Box<dyn std::error::Error>> {
    if rps == 0 {
        return Err("RATE_LIMIT_REQUESTS_PER_SECOND must be greater than 0".into());
    }
    if burst == 0 {
        return Err("RATE_LIMIT_BURST_SIZE must be greater than 0".into());
    }
    Ok(())
}

/// A model override off the allow-list is ignored at request time; only warn.
fn check_model_override(model: Option<&str>) {
    if let Some(model) = clean_value(model) {
        if !OpenAIRealtimeModel::is_allowed(model) {
            warn!(
                model,
                default = %OpenAIRealtimeModel::default(),
                "OPENAI_REALTIME_MODEL is not an allowed model and will be ignored"
            );
        }
    }
}
