//! Host capability traits and shared types for the call controller.
//!
//! The controller never talks to a real WebRTC stack directly. Peer
//! connections, data channels, microphone capture, playback and the signaling
//! round trip are all injected through the traits below, so negotiation can
//! be driven by a browser binding, a native WebRTC stack, or a test double.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::handshake::HandshakeError;
use crate::core::vad::AudioAnalyzer;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that end (or prevent) a call attempt.
#[derive(Debug, Error)]
pub enum CallError {
    /// A call is already negotiating or active
    #[error("Call already in progress (state: {0})")]
    Busy(CallState),

    /// Peer connection operation failed
    #[error("Peer connection error: {0}")]
    PeerConnection(String),

    /// ICE gathering did not finish in time
    #[error("ICE gathering did not complete within {0:?}")]
    IceGatheringTimeout(Duration),

    /// Relay answered with a non-success status
    #[error("Signaling relay rejected the offer ({status}): {body}")]
    SignalingRejected {
        /// HTTP status from the relay
        status: u16,
        /// JSON error body (empty object when the body was not JSON)
        body: serde_json::Value,
    },

    /// Relay could not be reached
    #[error("Signaling transport error: {0}")]
    SignalingTransport(String),

    /// Data channel operation failed
    #[error("Data channel error: {0}")]
    DataChannel(String),

    /// Microphone capture or track replacement failed
    #[error("Microphone error: {0}")]
    Microphone(String),

    /// Playback could not start
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Greeting handshake did not complete
    #[error("Handshake aborted: {0}")]
    Handshake(#[from] HandshakeError),

    /// The call was hung up while negotiation was in flight
    #[error("Call cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for CallError {
    fn from(err: reqwest::Error) -> Self {
        CallError::SignalingTransport(err.to_string())
    }
}

/// Result type for call operations.
pub type CallResult<T> = Result<T, CallError>;

// =============================================================================
// Call State
// =============================================================================

/// Lifecycle of a single call attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallState {
    /// No call; ready to dial
    #[default]
    Idle,
    /// Building the offer and exchanging SDP
    Negotiating,
    /// Answer applied; media and data channel live
    Active,
    /// Tearing down; returns to Idle immediately after
    Ended,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallState::Idle => write!(f, "Idle"),
            CallState::Negotiating => write!(f, "Negotiating"),
            CallState::Active => write!(f, "Active"),
            CallState::Ended => write!(f, "Ended"),
        }
    }
}

// =============================================================================
// Peer Connection Types
// =============================================================================

/// Media kind of a transceiver or remote track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Transceiver direction as declared in the offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransceiverDirection {
    SendRecv,
    RecvOnly,
}

/// Handle to a transceiver added to a peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransceiverId(pub usize);

/// ICE candidate gathering progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceGatheringState {
    New,
    Gathering,
    Complete,
}

/// ICE server entry (STUN or TURN).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceServer {
    pub urls: Vec<String>,
}

/// Parameters for a new peer connection.
#[derive(Debug, Clone, Default)]
pub struct PeerConnectionConfig {
    pub ice_servers: Vec<IceServer>,
}

/// Notifications emitted by a peer connection and its data channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    IceGatheringStateChange(IceGatheringState),
    IceConnectionStateChange(String),
    ConnectionStateChange(String),
    /// Remote track arrived
    Track {
        kind: MediaKind,
        track_id: String,
        stream_ids: Vec<String>,
    },
    DataChannelOpen,
    DataChannelMessage(String),
    DataChannelClose,
}

/// A freshly created peer connection and its event stream.
pub struct PeerHandle {
    pub connection: Arc<dyn PeerConnection>,
    pub events: mpsc::UnboundedReceiver<PeerEvent>,
}

// =============================================================================
// Capability Traits
// =============================================================================

/// Creates one peer connection per call attempt.
pub trait PeerConnectionFactory: Send + Sync {
    fn create(&self, config: &PeerConnectionConfig) -> CallResult<PeerHandle>;
}

/// A WebRTC peer connection owned by the host runtime.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    /// Reserve a media section before the offer is created.
    fn add_transceiver(
        &self,
        kind: MediaKind,
        direction: TransceiverDirection,
    ) -> CallResult<TransceiverId>;

    /// Open a negotiated data channel.
    fn create_data_channel(&self, label: &str) -> CallResult<Arc<dyn DataChannel>>;

    /// Build a local offer.
    async fn create_offer(&self) -> CallResult<String>;

    /// Apply the local offer; starts ICE gathering.
    async fn set_local_description(&self, sdp: &str) -> CallResult<()>;

    /// Current local description, including gathered candidates.
    fn local_description(&self) -> Option<String>;

    /// Current ICE gathering state.
    fn ice_gathering_state(&self) -> IceGatheringState;

    /// Apply the remote answer.
    async fn set_remote_answer(&self, sdp: &str) -> CallResult<()>;

    /// Substitute a live track into a previously reserved transceiver.
    async fn replace_track(
        &self,
        transceiver: TransceiverId,
        track: Arc<dyn LocalAudioTrack>,
    ) -> CallResult<()>;

    /// Stop every track currently attached to a sender.
    fn stop_sender_tracks(&self);

    /// Close the connection. Idempotent.
    fn close(&self);
}

/// Control data channel carried by the peer connection.
#[async_trait]
pub trait DataChannel: Send + Sync {
    fn label(&self) -> &str;

    fn is_open(&self) -> bool;

    async fn send_text(&self, text: String) -> CallResult<()>;

    /// Close the channel. Idempotent.
    fn close(&self);
}

/// A live local capture track.
pub trait LocalAudioTrack: Send + Sync {
    fn id(&self) -> &str;

    /// Release the capture device. Idempotent.
    fn stop(&self);
}

/// Microphone capture constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConstraints {
    pub channel_count: u32,
    pub noise_suppression: bool,
    pub echo_cancellation: bool,
    pub auto_gain_control: bool,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            channel_count: 1,
            noise_suppression: true,
            echo_cancellation: true,
            auto_gain_control: true,
        }
    }
}

/// Result of a microphone capture: the track plus an analyser on the same
/// stream for the voice activity indicator.
pub struct CapturedAudio {
    pub track: Arc<dyn LocalAudioTrack>,
    pub analyzer: Box<dyn AudioAnalyzer>,
}

/// Access to capture devices.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn capture_microphone(&self, constraints: &AudioConstraints) -> CallResult<CapturedAudio>;
}

/// Speaker playback of the remote agent.
pub trait AudioOutput: Send + Sync {
    /// Route a remote track to the speaker and start playback.
    fn play_remote(&self, track_id: &str) -> CallResult<()>;

    /// Playback volume, 0.0 - 1.0.
    fn set_volume(&self, volume: f32);
}

// =============================================================================
// Diagnostics
// =============================================================================

/// One diagnostic line surfaced to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    pub text: String,
}

/// Callback for diagnostic log lines.
pub type LogCallback = Arc<dyn Fn(LogLine) + Send + Sync>;

/// Callback for call state transitions.
pub type CallStateCallback = Arc<dyn Fn(CallState) + Send + Sync>;
