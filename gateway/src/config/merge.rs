use std::path::PathBuf;

use super::env::load_from_env;
use super::yaml::YamlConfig;
use super::{ServerConfig, TlsConfig};

/// Environment values first, then YAML overrides on top.
pub fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = load_from_env()?;

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(tls) = server.tls {
            match tls.enabled {
                Some(false) => config.tls = None,
                Some(true) => {
                    let cert_path = tls
                        .cert_path
                        .or_else(|| config.tls.as_ref().map(|t| t.cert_path.display().to_string()))
                        .ok_or("server.tls.enabled is true but cert_path is missing")?;
                    let key_path = tls
                        .key_path
                        .or_else(|| config.tls.as_ref().map(|t| t.key_path.display().to_string()))
                        .ok_or("server.tls.enabled is true but key_path is missing")?;
                    config.tls = Some(TlsConfig {
                        cert_path: PathBuf::from(cert_path),
                        key_path: PathBuf::from(key_path),
                    });
                }
                None => {
                    // Paths alone only adjust an already enabled TLS setup
                    if let Some(existing) = config.tls.as_mut() {
                        if let Some(cert_path) = tls.cert_path {
                            existing.cert_path = PathBuf::from(cert_path);
                        }
                        if let Some(key_path) = tls.key_path {
                            existing.key_path = PathBuf::from(key_path);
                        }
                    }
                }
            }
        }
    }

    if let Some(openai) = yaml.openai {
        if let Some(key) = openai.api_key.filter(|k| !k.trim().is_empty()) {
            config.openai_api_key = Some(key);
        }
        if let Some(model) = openai.realtime_model {
            config.openai_realtime_model = Some(model);
        }
        if let Some(voice) = openai.realtime_voice {
            config.openai_realtime_voice = Some(voice);
        }
        if let Some(url) = openai.realtime_url {
            config.realtime_url = url;
        }
    }

    if let Some(security) = yaml.security {
        if let Some(origins) = security.cors_allowed_origins {
            config.cors_allowed_origins = Some(origins);
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
    }

    Ok(config)
}

