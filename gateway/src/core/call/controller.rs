//! Peer connection controller.
//!
//! Drives one call at a time through `Idle -> Negotiating -> Active -> Ended`
//! and back to `Idle`:
//!
//! - Negotiating: create the peer connection, reserve a `sendrecv` audio and a
//!   `recvonly` video transceiver, open the control data channel, build the
//!   offer, wait for ICE gathering, post the offer to the relay.
//! - Active: apply the answer. When the data channel opens the greeting
//!   handshake runs, then the microphone is substituted into the reserved
//!   audio transceiver and the voice activity indicator starts.
//! - Ended: close the data channel, stop sender tracks, close the peer
//!   connection, stop the indicator.
//!
//! Relay failures, ICE timeouts and peer connection errors end the call the
//! same way a hangup does. A hangup during negotiation cancels it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::base::{
    AudioConstraints, AudioOutput, CallError, CallResult, CallState, CallStateCallback,
    CapturedAudio, DataChannel, IceGatheringState, IceServer, LogCallback, LogLine, MediaDevices,
    MediaKind, PeerConnection, PeerConnectionConfig, PeerConnectionFactory, PeerEvent, PeerHandle,
    TransceiverDirection, TransceiverId,
};
use super::handshake::{AgentPersona, GreetingHandshake};
use super::signaling::{OfferRequest, SignalingClient};
use crate::core::realtime::{DEFAULT_VOICE, ServerEventEnvelope};
use crate::core::vad::{TalkingCallback, VADConfig, VoiceActivityIndicator};

/// Public STUN server used for candidate gathering.
pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";

/// Label of the control data channel.
pub const DEFAULT_DATA_CHANNEL_LABEL: &str = "santa-data";

/// Model the page asks for.
pub const DEFAULT_CLIENT_MODEL: &str = "gpt-realtime";

/// Upper bound on the ICE gathering wait.
pub const DEFAULT_ICE_GATHERING_TIMEOUT: Duration = Duration::from_secs(10);

/// Playback volume while the user talks.
pub const TALKING_VOLUME: f32 = 0.6;

/// Playback volume otherwise.
pub const IDLE_VOLUME: f32 = 1.0;

/// Diagnostic lines kept in memory.
const MAX_LOG_LINES: usize = 500;

// =============================================================================
// Configuration
// =============================================================================

/// Per-controller call settings.
#[derive(Debug, Clone)]
pub struct CallConfig {
    pub ice_servers: Vec<IceServer>,
    pub data_channel_label: String,
    /// Model to request; `None` asks the relay for its default
    pub model: Option<String>,
    /// Voice to request; `None` asks the relay for its default
    pub voice: Option<String>,
    /// `None` waits for the transport's own gathering timeout
    pub ice_gathering_timeout: Option<Duration>,
    pub persona: AgentPersona,
    pub microphone: AudioConstraints,
    pub vad: VADConfig,
    pub talking_volume: f32,
    pub idle_volume: f32,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServer {
                urls: vec![DEFAULT_STUN_SERVER.to_string()],
            }],
            data_channel_label: DEFAULT_DATA_CHANNEL_LABEL.to_string(),
            model: Some(DEFAULT_CLIENT_MODEL.to_string()),
            voice: Some(DEFAULT_VOICE.to_string()),
            ice_gathering_timeout: Some(DEFAULT_ICE_GATHERING_TIMEOUT),
            persona: AgentPersona::default(),
            microphone: AudioConstraints::default(),
            vad: VADConfig::default(),
            talking_volume: TALKING_VOLUME,
            idle_volume: IDLE_VOLUME,
        }
    }
}

/// Host capabilities injected into the controller.
#[derive(Clone)]
pub struct CallCapabilities {
    pub peers: Arc<dyn PeerConnectionFactory>,
    pub media: Arc<dyn MediaDevices>,
    pub output: Arc<dyn AudioOutput>,
    pub signaling: Arc<dyn SignalingClient>,
}

// =============================================================================
// Diagnostics
// =============================================================================

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Timestamped diagnostic lines, mirrored to tracing.
#[derive(Clone, Default)]
struct DiagnosticLog {
    lines: Arc<Mutex<VecDeque<LogLine>>>,
    callback: Arc<Mutex<Option<LogCallback>>>,
}

impl DiagnosticLog {
    fn push(&self, text: impl Into<String>) {
        let line = LogLine {
            timestamp_ms: now_ms(),
            text: text.into(),
        };
        info!(target: "hotline::call", "{}", line.text);

        {
            let mut lines = self.lines.lock();
            if lines.len() >= MAX_LOG_LINES {
                lines.pop_front();
            }
            lines.push_back(line.clone());
        }

        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(line);
        }
    }

    fn snapshot(&self) -> Vec<LogLine> {
        self.lines.lock().iter().cloned().collect()
    }
}

// =============================================================================
// Call Resources
// =============================================================================

/// Everything a live call holds on to.
struct CallResources {
    connection: Arc<dyn PeerConnection>,
    channel: Arc<dyn DataChannel>,
    vad: Arc<Mutex<Option<VoiceActivityIndicator>>>,
    event_task: Option<JoinHandle<()>>,
}

impl CallResources {
    fn release(mut self) {
        self.channel.close();
        self.connection.stop_sender_tracks();
        self.connection.close();
        if let Some(indicator) = self.vad.lock().take() {
            indicator.stop();
        }
        if let Some(task) = self.event_task.take() {
            task.abort();
        }
    }
}

#[derive(Default)]
struct CallInner {
    state: CallState,
    /// Bumped on every start and teardown; stale negotiations compare against it
    generation: u64,
    /// Cancelled when the attempt is torn down
    cancel: CancellationToken,
    resources: Option<CallResources>,
}

// =============================================================================
// Controller
// =============================================================================

/// Single-call WebRTC controller.
pub struct CallController {
    config: CallConfig,
    caps: CallCapabilities,
    inner: Arc<Mutex<CallInner>>,
    log: DiagnosticLog,
    talking: Arc<AtomicBool>,
    on_state: Mutex<Option<CallStateCallback>>,
    on_talking: Mutex<Option<TalkingCallback>>,
}

impl CallController {
    pub fn new(config: CallConfig, caps: CallCapabilities) -> Self {
        Self {
            config,
            caps,
            inner: Arc::new(Mutex::new(CallInner::default())),
            log: DiagnosticLog::default(),
            talking: Arc::new(AtomicBool::new(false)),
            on_state: Mutex::new(None),
            on_talking: Mutex::new(None),
        }
    }

    /// Register a diagnostic log callback.
    pub fn on_log(&self, callback: LogCallback) {
        *self.log.callback.lock() = Some(callback);
    }

    /// Register a call state callback.
    pub fn on_state_change(&self, callback: CallStateCallback) {
        *self.on_state.lock() = Some(callback);
    }

    /// Register a talking-state callback. Takes effect from the next call.
    pub fn on_talking_change(&self, callback: TalkingCallback) {
        *self.on_talking.lock() = Some(callback);
    }

    pub fn config(&self) -> &CallConfig {
        &self.config
    }

    pub fn state(&self) -> CallState {
        self.inner.lock().state
    }

    /// Whether the local indicator currently reports speech.
    pub fn is_talking(&self) -> bool {
        self.talking.load(Ordering::Relaxed)
    }

    /// Diagnostic lines recorded so far.
    pub fn logs(&self) -> Vec<LogLine> {
        self.log.snapshot()
    }

    fn notify_state(&self, state: CallState) {
        let callback = self.on_state.lock().clone();
        if let Some(callback) = callback {
            callback(state);
        }
    }

    /// Dial. Fails with `CallError::Busy` unless idle.
    ///
    /// Returns once the answer is applied; the greeting and microphone attach
    /// happen afterwards on the call's event task.
    pub async fn start_call(&self) -> CallResult<()> {
        let (generation, cancel) = {
            let mut inner = self.inner.lock();
            if inner.state != CallState::Idle {
                debug!(state = %inner.state, "Ignoring start while a call is in progress");
                return Err(CallError::Busy(inner.state));
            }
            inner.state = CallState::Negotiating;
            inner.generation += 1;
            inner.cancel = CancellationToken::new();
            (inner.generation, inner.cancel.clone())
        };
        self.notify_state(CallState::Negotiating);
        self.log.push("Initializing WebRTC...");

        let result = tokio::select! {
            result = self.negotiate(generation, &cancel) => result,
            _ = cancel.cancelled() => Err(CallError::Cancelled),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if cancel.is_cancelled() || matches!(e, CallError::Cancelled) => {
                debug!("Negotiation cancelled by hangup");
                Err(CallError::Cancelled)
            }
            Err(e) => {
                error!(error = %e, "Call negotiation failed");
                self.log.push(format!("Call failed: {e}"));
                self.end_call(Some(generation));
                Err(e)
            }
        }
    }

    /// Hang up. No-op when idle.
    pub fn hangup(&self) {
        if self.end_call(None) {
            self.log.push("Call ended");
        }
    }

    /// Tear down the current call, optionally only if it is still
    /// `expected_generation`. Returns whether anything was torn down.
    fn end_call(&self, expected_generation: Option<u64>) -> bool {
        let resources = {
            let mut inner = self.inner.lock();
            if inner.state == CallState::Idle {
                return false;
            }
            if expected_generation.is_some_and(|g| g != inner.generation) {
                return false;
            }
            inner.state = CallState::Ended;
            inner.generation += 1;
            inner.cancel.cancel();
            inner.resources.take()
        };
        self.notify_state(CallState::Ended);

        if let Some(resources) = resources {
            resources.release();
        }
        self.talking.store(false, Ordering::Relaxed);
        self.caps.output.set_volume(self.config.idle_volume);

        self.inner.lock().state = CallState::Idle;
        self.notify_state(CallState::Idle);
        true
    }

    fn ensure_current(&self, generation: u64) -> CallResult<()> {
        if self.inner.lock().generation == generation {
            Ok(())
        } else {
            Err(CallError::Cancelled)
        }
    }

    /// Pinned model/voice, filling gaps from the relay's defaults.
    async fn resolve_session(&self) -> (Option<String>, Option<String>) {
        let mut model = self.config.model.clone();
        let mut voice = self.config.voice.clone();

        if model.is_none() || voice.is_none() {
            match self.caps.signaling.session_defaults().await {
                Ok(defaults) => {
                    if model.is_none() {
                        model = Some(defaults.model);
                    }
                    if voice.is_none() {
                        voice = Some(defaults.voice);
                    }
                }
                Err(e) => warn!(error = %e, "Could not fetch session defaults, relay will decide"),
            }
        }

        (model, voice)
    }

    async fn negotiate(&self, generation: u64, cancel: &CancellationToken) -> CallResult<()> {
        let (model, voice) = self.resolve_session().await;

        let PeerHandle {
            connection,
            mut events,
        } = self.caps.peers.create(&PeerConnectionConfig {
            ice_servers: self.config.ice_servers.clone(),
        })?;

        let channel = match connection.create_data_channel(&self.config.data_channel_label) {
            Ok(channel) => channel,
            Err(e) => {
                connection.close();
                return Err(e);
            }
        };

        let vad_slot = Arc::new(Mutex::new(None));
        {
            let resources = CallResources {
                connection: connection.clone(),
                channel: channel.clone(),
                vad: vad_slot.clone(),
                event_task: None,
            };
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                drop(inner);
                resources.release();
                return Err(CallError::Cancelled);
            }
            inner.resources = Some(resources);
        }

        let audio_transceiver =
            connection.add_transceiver(MediaKind::Audio, TransceiverDirection::SendRecv)?;
        connection.add_transceiver(MediaKind::Video, TransceiverDirection::RecvOnly)?;

        let offer = connection.create_offer().await?;
        connection.set_local_description(&offer).await?;

        self.log.push("Gathering ICE candidates...");
        let mut early_events = Vec::new();
        wait_for_ice_gathering(
            connection.as_ref(),
            &mut events,
            self.config.ice_gathering_timeout,
            cancel,
            &mut early_events,
        )
        .await?;
        self.ensure_current(generation)?;

        let sdp = connection.local_description().unwrap_or(offer);
        self.log.push("Sending offer to relay...");
        let request = OfferRequest {
            sdp,
            voice: voice.clone(),
            model,
        };
        let answer = match self.caps.signaling.exchange(&request).await {
            Ok(answer) => answer,
            Err(e) => {
                if let CallError::SignalingRejected { body, .. } = &e {
                    self.log.push(format!("SDP error: {body}"));
                }
                return Err(e);
            }
        };
        self.ensure_current(generation)?;

        connection.set_remote_answer(&answer).await?;
        self.log.push("Remote description set");

        let worker = SessionWorker {
            generation,
            inner: self.inner.clone(),
            connection,
            channel,
            audio_transceiver,
            media: self.caps.media.clone(),
            output: self.caps.output.clone(),
            handshake: GreetingHandshake::new(
                self.config.persona.clone(),
                voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            ),
            microphone: self.config.microphone.clone(),
            vad_config: self.config.vad.clone(),
            vad_slot,
            talking: self.talking.clone(),
            on_talking: self.on_talking.lock().clone(),
            talking_volume: self.config.talking_volume,
            idle_volume: self.config.idle_volume,
            log: self.log.clone(),
        };
        let task = tokio::spawn(worker.run(events, early_events));

        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                task.abort();
                return Err(CallError::Cancelled);
            }
            inner.state = CallState::Active;
            if let Some(resources) = inner.resources.as_mut() {
                resources.event_task = Some(task);
            }
        }
        self.notify_state(CallState::Active);
        self.log.push("Connected. Talk to Santa!");

        Ok(())
    }
}

impl Drop for CallController {
    fn drop(&mut self) {
        if let Some(resources) = self.inner.lock().resources.take() {
            resources.release();
        }
    }
}

/// Wait until ICE gathering reports completion.
///
/// Events that arrive meanwhile are kept in `early` so the call's event task
/// can replay them. A hangup ends the wait with `CallError::Cancelled`.
async fn wait_for_ice_gathering(
    connection: &dyn PeerConnection,
    events: &mut mpsc::UnboundedReceiver<PeerEvent>,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
    early: &mut Vec<PeerEvent>,
) -> CallResult<()> {
    if connection.ice_gathering_state() == IceGatheringState::Complete {
        return Ok(());
    }

    let wait = async {
        while let Some(event) = events.recv().await {
            match event {
                PeerEvent::IceGatheringStateChange(IceGatheringState::Complete) => return Ok(()),
                PeerEvent::IceGatheringStateChange(state) => {
                    debug!(?state, "ICE gathering state");
                }
                other => early.push(other),
            }
        }
        Err(CallError::PeerConnection(
            "peer connection closed during ICE gathering".to_string(),
        ))
    };

    let bounded = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .unwrap_or(Err(CallError::IceGatheringTimeout(limit))),
            None => wait.await,
        }
    };

    tokio::select! {
        result = bounded => result,
        _ = cancel.cancelled() => Err(CallError::Cancelled),
    }
}

// =============================================================================
// Session Worker
// =============================================================================

/// Event task of an active call.
struct SessionWorker {
    generation: u64,
    inner: Arc<Mutex<CallInner>>,
    connection: Arc<dyn PeerConnection>,
    channel: Arc<dyn DataChannel>,
    audio_transceiver: TransceiverId,
    media: Arc<dyn MediaDevices>,
    output: Arc<dyn AudioOutput>,
    handshake: GreetingHandshake,
    microphone: AudioConstraints,
    vad_config: VADConfig,
    vad_slot: Arc<Mutex<Option<VoiceActivityIndicator>>>,
    talking: Arc<AtomicBool>,
    on_talking: Option<TalkingCallback>,
    talking_volume: f32,
    idle_volume: f32,
    log: DiagnosticLog,
}

impl SessionWorker {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<PeerEvent>,
        early_events: Vec<PeerEvent>,
    ) {
        for event in early_events {
            self.handle(event).await;
        }
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        debug!("Peer event stream closed");
    }

    async fn handle(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::IceGatheringStateChange(state) => {
                debug!(?state, "ICE gathering state");
            }
            PeerEvent::IceConnectionStateChange(state) => {
                self.log.push(format!("ICE state: {state}"));
            }
            PeerEvent::ConnectionStateChange(state) => {
                self.log.push(format!("PC state: {state}"));
            }
            PeerEvent::Track {
                kind: MediaKind::Audio,
                track_id,
                ..
            } => {
                self.log.push(format!("Remote audio track: {track_id}"));
                self.output.set_volume(self.idle_volume);
                if let Err(e) = self.output.play_remote(&track_id) {
                    self.log.push(format!("Audio playback failed: {e}"));
                }
            }
            PeerEvent::Track { kind, track_id, .. } => {
                debug!(%kind, %track_id, "Ignoring remote track");
            }
            PeerEvent::DataChannelOpen => self.on_channel_open().await,
            PeerEvent::DataChannelMessage(payload) => {
                if ServerEventEnvelope::peek(&payload).is_some_and(|e| e.is_error()) {
                    warn!(%payload, "Agent reported an error");
                }
                self.log.push(format!("DC: {payload}"));
            }
            PeerEvent::DataChannelClose => self.log.push("Data channel closed"),
        }
    }

    async fn on_channel_open(&mut self) {
        self.log.push("Data channel open");

        if let Err(e) = self.handshake.run(self.channel.as_ref()).await {
            self.log.push(format!("Greeting handshake aborted: {e}"));
            return;
        }
        self.log.push("Greeting requested");

        if let Err(e) = self.attach_microphone().await {
            self.log.push(format!("Microphone error: {e}"));
        }
    }

    async fn attach_microphone(&self) -> CallResult<()> {
        let CapturedAudio { track, analyzer } =
            self.media.capture_microphone(&self.microphone).await?;

        if let Err(e) = self
            .connection
            .replace_track(self.audio_transceiver, track.clone())
            .await
        {
            track.stop();
            return Err(e);
        }
        self.log.push(format!("Microphone attached: {}", track.id()));

        if !self.vad_config.enabled {
            return Ok(());
        }
        if let Err(e) = self.vad_config.validate() {
            warn!(error = %e, "Invalid VAD configuration, talking indicator disabled");
            return Ok(());
        }

        let indicator =
            VoiceActivityIndicator::spawn(analyzer, self.vad_config.clone(), self.talking_callback());

        let inner = self.inner.lock();
        if inner.generation == self.generation {
            *self.vad_slot.lock() = Some(indicator);
        } else {
            indicator.stop();
        }
        Ok(())
    }

    fn talking_callback(&self) -> TalkingCallback {
        let talking = self.talking.clone();
        let output = self.output.clone();
        let on_talking = self.on_talking.clone();
        let (talking_volume, idle_volume) = (self.talking_volume, self.idle_volume);

        Arc::new(move |is_talking| {
            talking.store(is_talking, Ordering::Relaxed);
            output.set_volume(if is_talking { talking_volume } else { idle_volume });
            if let Some(callback) = &on_talking {
                callback(is_talking);
            }
        })
    }
}
