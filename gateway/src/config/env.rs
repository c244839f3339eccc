use std::path::PathBuf;

use super::utils::{env_var, parse_bool, parse_env};
use super::{ServerConfig, TlsConfig};
use crate::core::realtime::OPENAI_REALTIME_URL;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_RATE_LIMIT_RPS: u32 = 60;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

/// Build a configuration from environment variables and defaults.
///
/// Recognised variables:
/// - `HOST`, `PORT`
/// - `TLS_ENABLED`, `TLS_CERT_PATH`, `TLS_KEY_PATH`
/// - `OPENAI_API_KEY`, `OPENAI_REALTIME_MODEL`, `OPENAI_REALTIME_VOICE`, `OPENAI_REALTIME_URL`
/// - `CORS_ALLOWED_ORIGINS`
/// - `RATE_LIMIT_REQUESTS_PER_SECOND`, `RATE_LIMIT_BURST_SIZE`
pub fn load_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let host = env_var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = parse_env("PORT", DEFAULT_PORT)?;

    let tls_enabled = match env_var("TLS_ENABLED") {
        Some(value) => parse_bool(&value)
            .ok_or_else(|| format!("Invalid value for TLS_ENABLED ('{value}')"))?,
        None => false,
    };
    let tls = if tls_enabled {
        let cert_path = env_var("TLS_CERT_PATH")
            .ok_or("TLS_ENABLED is set but TLS_CERT_PATH is missing")?;
        let key_path =
            env_var("TLS_KEY_PATH").ok_or("TLS_ENABLED is set but TLS_KEY_PATH is missing")?;
        Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        })
    } else {
        None
    };

    Ok(ServerConfig {
        host,
        port,
        tls,
        openai_api_key: env_var("OPENAI_API_KEY"),
        openai_realtime_model: env_var("OPENAI_REALTIME_MODEL"),
        openai_realtime_voice: env_var("OPENAI_REALTIME_VOICE"),
        realtime_url: env_var("OPENAI_REALTIME_URL")
            .unwrap_or_else(|| OPENAI_REALTIME_URL.to_string()),
        cors_allowed_origins: env_var("CORS_ALLOWED_ORIGINS"),
        rate_limit_requests_per_second: parse_env(
            "RATE_LIMIT_REQUESTS_PER_SECOND",
            DEFAULT_RATE_LIMIT_RPS,
        )?,
        rate_limit_burst_size: parse_env("RATE_LIMIT_BURST_SIZE", DEFAULT_RATE_LIMIT_BURST)?,
    })
}
