//! Voice Activity Detection (VAD) module
//!
//! A local, amplitude-based "is the user talking" signal used purely for UI
//! feedback (status dot, ducking the agent's playback volume). Actual
//! turn-taking is left to the remote agent's server-side VAD.
//!
//! # Example
//!
//! ```rust,ignore
//! use hotline_gateway::core::vad::{VADConfig, VoiceActivityIndicator};
//! use std::sync::Arc;
//!
//! let indicator = VoiceActivityIndicator::spawn(
//!     analyzer,
//!     VADConfig::default(),
//!     Arc::new(|talking| println!("talking: {talking}")),
//! );
//! // ...
//! indicator.stop();
//! ```

pub mod config;
pub mod detector;

pub use config::VADConfig;
pub use detector::{
    AudioAnalyzer, EnergyVAD, TalkingCallback, VADResult, VoiceActivityDetector,
    VoiceActivityIndicator, frame_rms,
};
