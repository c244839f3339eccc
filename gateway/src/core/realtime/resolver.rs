//! Model and voice resolution.
//!
//! Both values are resolved with the same precedence: client-supplied value,
//! then environment override, then the built-in default. Models additionally
//! have to be on the allow-list; an invalid value is skipped silently.

use serde::{Deserialize, Serialize};

use super::config::{DEFAULT_VOICE, OpenAIRealtimeModel};

/// Model and voice a call is negotiated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDefaults {
    pub model: String,
    pub voice: String,
}

/// Trim whitespace and stray wrapping double quotes.
///
/// Returns `None` when nothing is left, so empty values fall through to the
/// next precedence tier.
pub fn clean_value(value: Option<&str>) -> Option<&str> {
    let cleaned = value?.trim().trim_matches('"');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Resolve the model to negotiate with.
pub fn resolve_model(client: Option<&str>, env: Option<&str>) -> OpenAIRealtimeModel {
    clean_value(client)
        .and_then(OpenAIRealtimeModel::from_allowed)
        .or_else(|| clean_value(env).and_then(OpenAIRealtimeModel::from_allowed))
        .unwrap_or_default()
}

/// Resolve the voice label. Any non-empty value is accepted.
pub fn resolve_voice(client: Option<&str>, env: Option<&str>) -> String {
    clean_value(client)
        .or_else(|| clean_value(env))
        .unwrap_or(DEFAULT_VOICE)
        .to_string()
}

/// Defaults advertised by the configuration endpoint (no client tier).
pub fn server_defaults(env_model: Option<&str>, env_voice: Option<&str>) -> SessionDefaults {
    SessionDefaults {
        model: resolve_model(None, env_model).as_str().to_string(),
        voice: resolve_voice(None, env_voice),
    }
}
