//! Upstream endpoint URL validation
//!
//! The API key is sent to whatever endpoint is configured, so the URL must:
//! - Be properly formatted with a host
//! - Use HTTPS, except for loopback hosts (local test stubs)
//! - Carry no credentials of its own

use std::net::IpAddr;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Errors that can occur during URL validation
#[derive(Debug, Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("URL scheme must be HTTPS, got: {0}")]
    HttpsRequired(String),

    #[error("URL must have a host")]
    MissingHost,

    #[error("URL must not embed credentials")]
    EmbeddedCredentials,
}

/// Whether a parsed URL points at the local machine
pub fn is_loopback_host(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(url::Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

/// Validates the upstream Realtime endpoint
///
/// # Example
/// ```rust,ignore
/// use hotline_gateway::utils::validate_upstream_url;
///
/// assert!(validate_upstream_url("https://api.openai.com/v1/realtime").is_ok());
/// assert!(validate_upstream_url("http://127.0.0.1:8081/v1/realtime").is_ok());
/// assert!(validate_upstream_url("http://api.openai.com/v1/realtime").is_err());
/// ```
pub fn validate_upstream_url(url: &str) -> Result<Url, UrlValidationError> {
    let parsed = Url::parse(url)?;

    if parsed.host().is_none() {
        return Err(UrlValidationError::MissingHost);
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(UrlValidationError::EmbeddedCredentials);
    }

    match parsed.scheme() {
        "https" => {}
        "http" if is_loopback_host(&parsed) => {
            warn!(url = %parsed, "Using plain HTTP upstream on loopback");
        }
        other => return Err(UrlValidationError::HttpsRequired(other.to_string())),
    }

    Ok(parsed)
}
