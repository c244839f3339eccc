//! OpenAI Realtime API configuration types.
//!
//! This module contains the fixed values the hotline negotiates with:
//! - Upstream SDP negotiation endpoint
//! - Model allow-list
//! - Default voice
//! - Response modalities

use serde::{Deserialize, Serialize};

/// OpenAI Realtime API SDP negotiation endpoint (WebRTC flavour).
pub const OPENAI_REALTIME_URL: &str = "https://api.openai.com/v1/realtime";

/// Value of the `OpenAI-Beta` header sent with every negotiation.
pub const OPENAI_BETA_HEADER: &str = "realtime=v1";

/// Voice used when neither the client nor the environment picks one.
pub const DEFAULT_VOICE: &str = "ash";

// =============================================================================
// Models
// =============================================================================

/// Realtime models the relay is allowed to negotiate with.
///
/// Anything not listed here is rejected by the resolver in favour of the next
/// precedence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OpenAIRealtimeModel {
    /// Recommended stable snapshot
    #[default]
    #[serde(rename = "gpt-4o-realtime-preview-2025-06-03")]
    Gpt4oRealtimePreview20250603,
    #[serde(rename = "gpt-4o-realtime-preview")]
    Gpt4oRealtimePreview,
    #[serde(rename = "gpt-4o-realtime-preview-2024-12-17")]
    Gpt4oRealtimePreview20241217,
    #[serde(rename = "gpt-4o-realtime-preview-2024-10-01")]
    Gpt4oRealtimePreview20241001,
    #[serde(rename = "gpt-4o-mini-realtime-preview")]
    Gpt4oMiniRealtimePreview,
    #[serde(rename = "gpt-4o-mini-realtime-preview-2024-12-17")]
    Gpt4oMiniRealtimePreview20241217,
    #[serde(rename = "gpt-realtime")]
    GptRealtime,
    #[serde(rename = "gpt-realtime-2025-08-28")]
    GptRealtime20250828,
    #[serde(rename = "gpt-realtime-mini")]
    GptRealtimeMini,
    #[serde(rename = "gpt-realtime-mini-2025-10-06")]
    GptRealtimeMini20251006,
}

impl OpenAIRealtimeModel {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt4oRealtimePreview20250603 => "gpt-4o-realtime-preview-2025-06-03",
            Self::Gpt4oRealtimePreview => "gpt-4o-realtime-preview",
            Self::Gpt4oRealtimePreview20241217 => "gpt-4o-realtime-preview-2024-12-17",
            Self::Gpt4oRealtimePreview20241001 => "gpt-4o-realtime-preview-2024-10-01",
            Self::Gpt4oMiniRealtimePreview => "gpt-4o-mini-realtime-preview",
            Self::Gpt4oMiniRealtimePreview20241217 => "gpt-4o-mini-realtime-preview-2024-12-17",
            Self::GptRealtime => "gpt-realtime",
            Self::GptRealtime20250828 => "gpt-realtime-2025-08-28",
            Self::GptRealtimeMini => "gpt-realtime-mini",
            Self::GptRealtimeMini20251006 => "gpt-realtime-mini-2025-10-06",
        }
    }

    /// Look up an allow-listed model by its exact identifier.
    ///
    /// Matching is case-sensitive: model ids are opaque upstream identifiers.
    pub fn from_allowed(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|model| model.as_str() == s)
    }

    /// Check whether an identifier is on the allow-list.
    pub fn is_allowed(s: &str) -> bool {
        Self::from_allowed(s).is_some()
    }

    /// Get every allow-listed model.
    pub fn all() -> &'static [OpenAIRealtimeModel] {
        &[
            Self::Gpt4oRealtimePreview20250603,
            Self::Gpt4oRealtimePreview,
            Self::Gpt4oRealtimePreview20241217,
            Self::Gpt4oRealtimePreview20241001,
            Self::Gpt4oMiniRealtimePreview,
            Self::Gpt4oMiniRealtimePreview20241217,
            Self::GptRealtime,
            Self::GptRealtime20250828,
            Self::GptRealtimeMini,
            Self::GptRealtimeMini20251006,
        ]
    }
}

impl std::fmt::Display for OpenAIRealtimeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Modalities
// =============================================================================

/// Output modalities for OpenAI Realtime API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Text output
    Text,
    /// Audio output
    Audio,
}

impl Modality {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Audio => "audio",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
