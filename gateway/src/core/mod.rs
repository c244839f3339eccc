pub mod call;
pub mod realtime;
pub mod vad;

// Re-export commonly used types for convenience
pub use realtime::{
    NegotiatedAnswer, OpenAIRealtimeModel, RealtimeRelay, SessionDefaults, SignalingError,
    SignalingResult,
};

pub use call::{CallCapabilities, CallConfig, CallController, CallError, CallState};

pub use vad::{VADConfig, VoiceActivityIndicator};
