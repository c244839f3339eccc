//! Client-side call control.
//!
//! The browser half of the hotline, expressed against injected host
//! capabilities so it runs the same against a real WebRTC stack or a test
//! double:
//!
//! - `base` - capability traits (`PeerConnection`, `DataChannel`, ...) and `CallError`
//! - `handshake` - the three-step greeting sequence on the control channel
//! - `signaling` - `SignalingClient` and its HTTP implementation
//! - `controller` - `CallController`, the call state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use hotline_gateway::core::call::{
//!     CallCapabilities, CallConfig, CallController, HttpSignalingClient,
//! };
//! use std::sync::Arc;
//!
//! let caps = CallCapabilities {
//!     peers,
//!     media,
//!     output,
//!     signaling: Arc::new(HttpSignalingClient::new("http://localhost:3001")?),
//! };
//! let controller = CallController::new(CallConfig::default(), caps);
//! controller.on_log(Arc::new(|line| println!("{}", line.text)));
//! controller.start_call().await?;
//! // ...
//! controller.hangup();
//! ```

mod base;
mod controller;
mod handshake;
mod signaling;

pub use base::{
    AudioConstraints, AudioOutput, CallError, CallResult, CallState, CallStateCallback,
    CapturedAudio, DataChannel, IceGatheringState, IceServer, LocalAudioTrack, LogCallback,
    LogLine, MediaDevices, MediaKind, PeerConnection, PeerConnectionConfig,
    PeerConnectionFactory, PeerEvent, PeerHandle, TransceiverDirection, TransceiverId,
};
pub use controller::{
    CallCapabilities, CallConfig, CallController, DEFAULT_CLIENT_MODEL,
    DEFAULT_DATA_CHANNEL_LABEL, DEFAULT_ICE_GATHERING_TIMEOUT, DEFAULT_STUN_SERVER, IDLE_VOLUME,
    TALKING_VOLUME,
};
pub use handshake::{
    AgentPersona, GreetingHandshake, HANDSHAKE_STEPS, HandshakeError, HandshakeState,
    SANTA_GREETING, SANTA_INSTRUCTIONS,
};
pub use signaling::{CONFIG_PATH, HttpSignalingClient, OfferRequest, SDP_PATH, SignalingClient};
