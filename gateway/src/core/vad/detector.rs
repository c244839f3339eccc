//! Energy (RMS) voice activity detector

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::config::VADConfig;

/// Midpoint of unsigned 8-bit time-domain samples
const BYTE_SAMPLE_CENTER: f32 = 128.0;

/// Result of VAD processing for a single audio frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VADResult {
    /// Whether the current frame counts as speech
    pub is_speech: bool,
    /// Root-mean-square amplitude of the frame (0.0 - 1.0)
    pub rms: f32,
    /// Whether speech just started (transition from silence to speech)
    pub speech_start: bool,
    /// Whether speech just ended (transition from speech to silence)
    pub speech_end: bool,
}

impl VADResult {
    /// Whether the talking state flipped on this frame
    pub fn changed(&self) -> bool {
        self.speech_start || self.speech_end
    }
}

/// Source of time-domain audio frames (an audio graph analyser node).
pub trait AudioAnalyzer: Send {
    /// Set the analysis window in samples
    fn set_fft_size(&mut self, size: usize);

    /// Current analysis window in samples
    fn fft_size(&self) -> usize;

    /// Copy the most recent frame as unsigned 8-bit samples centred at 128
    fn byte_time_domain_data(&mut self, buffer: &mut [u8]);
}

/// Trait for Voice Activity Detection implementations
pub trait VoiceActivityDetector: Send + Sync {
    /// Process a single byte time-domain frame and return the VAD result
    fn process_frame(&mut self, frame: &[u8]) -> VADResult;

    /// Reset internal state (call when starting a new audio stream)
    fn reset(&mut self);

    /// Check if currently in speech state
    fn is_speaking(&self) -> bool;

    /// Get the configuration
    fn config(&self) -> &VADConfig;
}

/// RMS of an unsigned 8-bit time-domain frame, normalised to 0.0 - 1.0.
pub fn frame_rms(frame: &[u8]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f32 = frame
        .iter()
        .map(|&b| {
            let v = (b as f32 - BYTE_SAMPLE_CENTER) / BYTE_SAMPLE_CENTER;
            v * v
        })
        .sum();
    (sum / frame.len() as f32).sqrt()
}

/// Fixed-threshold energy detector.
///
/// A UX aid only: the remote agent's own turn detection decides barge-in.
pub struct EnergyVAD {
    config: VADConfig,
    talking: bool,
    total_frames: u64,
}

impl EnergyVAD {
    /// Create a new detector, starting in the not-talking state
    pub fn new(config: VADConfig) -> Self {
        Self {
            config,
            talking: false,
            total_frames: 0,
        }
    }

    /// Number of frames processed since the last reset
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

impl VoiceActivityDetector for EnergyVAD {
    fn process_frame(&mut self, frame: &[u8]) -> VADResult {
        self.total_frames += 1;

        let rms = frame_rms(frame);
        let is_speech = rms > self.config.threshold;
        let speech_start = is_speech && !self.talking;
        let speech_end = !is_speech && self.talking;
        self.talking = is_speech;

        trace!(rms, is_speech, "VAD frame");

        VADResult {
            is_speech,
            rms,
            speech_start,
            speech_end,
        }
    }

    fn reset(&mut self) {
        self.talking = false;
        self.total_frames = 0;
    }

    fn is_speaking(&self) -> bool {
        self.talking
    }

    fn config(&self) -> &VADConfig {
        &self.config
    }
}

/// Callback invoked with the new talking state whenever it flips
pub type TalkingCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Periodic task reading an analyser and reporting talking-state edges.
///
/// The task owns the analyser; it only ever notifies through the callback.
/// Dropping the indicator stops it.
pub struct VoiceActivityIndicator {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl VoiceActivityIndicator {
    /// Start polling `analyzer` once per configured tick.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        mut analyzer: Box<dyn AudioAnalyzer>,
        config: VADConfig,
        on_change: TalkingCallback,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            analyzer.set_fft_size(config.fft_size);
            let mut buffer = vec![BYTE_SAMPLE_CENTER as u8; analyzer.fft_size()];
            let mut interval = tokio::time::interval(config.tick_interval());
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut vad = EnergyVAD::new(config);

            debug!(
                threshold = vad.config().threshold,
                fft_size = buffer.len(),
                "Voice activity indicator started"
            );

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        analyzer.byte_time_domain_data(&mut buffer);
                        let result = vad.process_frame(&buffer);
                        if result.changed() {
                            on_change(result.is_speech);
                        }
                    }
                }
            }

            debug!(frames = vad.total_frames(), "Voice activity indicator stopped");
        });

        Self { cancel, handle }
    }

    /// Stop polling. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether the polling task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for VoiceActivityIndicator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
