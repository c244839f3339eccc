//! Integration tests for the voice activity indicator

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{sleep, timeout};

use hotline_gateway::core::vad::{AudioAnalyzer, VADConfig, VoiceActivityIndicator};

/// Analyser fed by a shared amplitude, counting reads.
struct ScriptedAnalyzer {
    amplitude: Arc<Mutex<u8>>,
    reads: Arc<AtomicUsize>,
    fft_size: usize,
}

impl AudioAnalyzer for ScriptedAnalyzer {
    fn set_fft_size(&mut self, size: usize) {
        self.fft_size = size;
    }

    fn fft_size(&self) -> usize {
        self.fft_size
    }

    fn byte_time_domain_data(&mut self, buffer: &mut [u8]) {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let amplitude = *self.amplitude.lock();
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = if i % 2 == 0 {
                128u8.saturating_add(amplitude)
            } else {
                128u8.saturating_sub(amplitude)
            };
        }
    }
}

struct Fixture {
    amplitude: Arc<Mutex<u8>>,
    reads: Arc<AtomicUsize>,
    edges: Arc<Mutex<Vec<bool>>>,
    indicator: VoiceActivityIndicator,
}

fn fast_config() -> VADConfig {
    VADConfig {
        tick_interval_ms: 2,
        ..Default::default()
    }
}

fn spawn_indicator(config: VADConfig) -> Fixture {
    let amplitude = Arc::new(Mutex::new(0u8));
    let reads = Arc::new(AtomicUsize::new(0));
    let edges = Arc::new(Mutex::new(Vec::new()));

    let analyzer = ScriptedAnalyzer {
        amplitude: amplitude.clone(),
        reads: reads.clone(),
        fft_size: 0,
    };
    let sink = edges.clone();
    let indicator = VoiceActivityIndicator::spawn(
        Box::new(analyzer),
        config,
        Arc::new(move |talking: bool| sink.lock().push(talking)),
    );

    Fixture {
        amplitude,
        reads,
        edges,
        indicator,
    }
}

async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let result = timeout(Duration::from_secs(2), async {
        while !condition() {
            sleep(Duration::from_millis(2)).await;
        }
    })
    .await;
    assert!(result.is_ok(), "timed out waiting for {what}");
}

#[tokio::test]
async fn test_silence_never_notifies() {
    let f = spawn_indicator(fast_config());

    wait_until("a few reads", || f.reads.load(Ordering::SeqCst) >= 5).await;
    assert!(f.edges.lock().is_empty());

    f.indicator.stop();
}

#[tokio::test]
async fn test_reports_each_edge_once() {
    let f = spawn_indicator(fast_config());

    // 32/128 = 0.25 rms, well above the 0.03 threshold
    *f.amplitude.lock() = 32;
    wait_until("speech start", || f.edges.lock().len() == 1).await;

    // Sustained speech does not re-notify
    let reads = f.reads.load(Ordering::SeqCst);
    wait_until("more reads", || f.reads.load(Ordering::SeqCst) >= reads + 5).await;
    assert_eq!(*f.edges.lock(), vec![true]);

    *f.amplitude.lock() = 0;
    wait_until("speech end", || f.edges.lock().len() == 2).await;
    assert_eq!(*f.edges.lock(), vec![true, false]);

    f.indicator.stop();
}

#[tokio::test]
async fn test_quiet_signal_below_threshold() {
    let f = spawn_indicator(fast_config());

    // 3/128 is about 0.023 rms
    *f.amplitude.lock() = 3;
    wait_until("a few reads", || f.reads.load(Ordering::SeqCst) >= 10).await;
    assert!(f.edges.lock().is_empty());

    f.indicator.stop();
}

#[tokio::test]
async fn test_custom_threshold() {
    let f = spawn_indicator(VADConfig {
        threshold: 0.5,
        ..fast_config()
    });

    *f.amplitude.lock() = 32;
    wait_until("a few reads", || f.reads.load(Ordering::SeqCst) >= 10).await;
    assert!(f.edges.lock().is_empty());

    *f.amplitude.lock() = 100;
    wait_until("speech start", || f.edges.lock().len() == 1).await;

    f.indicator.stop();
}

#[tokio::test]
async fn test_stop_halts_polling() {
    let f = spawn_indicator(fast_config());
    wait_until("first read", || f.reads.load(Ordering::SeqCst) > 0).await;

    f.indicator.stop();
    wait_until("task exit", || f.indicator.is_finished()).await;

    let reads = f.reads.load(Ordering::SeqCst);
    *f.amplitude.lock() = 64;
    sleep(Duration::from_millis(20)).await;
    assert_eq!(f.reads.load(Ordering::SeqCst), reads);
    assert!(f.edges.lock().is_empty());

    // Idempotent
    f.indicator.stop();
}

#[tokio::test]
async fn test_drop_stops_indicator() {
    let f = spawn_indicator(fast_config());
    wait_until("first read", || f.reads.load(Ordering::SeqCst) > 0).await;

    let reads = f.reads.clone();
    drop(f.indicator);
    sleep(Duration::from_millis(20)).await;

    let after_drop = reads.load(Ordering::SeqCst);
    sleep(Duration::from_millis(20)).await;
    assert_eq!(reads.load(Ordering::SeqCst), after_drop);
}

#[tokio::test]
async fn test_analyzer_window_is_configured() {
    let seen = Arc::new(AtomicUsize::new(0));
    let configured = Arc::new(AtomicBool::new(false));

    struct WindowRecorder {
        seen: Arc<AtomicUsize>,
        configured: Arc<AtomicBool>,
        fft_size: usize,
    }

    impl AudioAnalyzer for WindowRecorder {
        fn set_fft_size(&mut self, size: usize) {
            self.fft_size = size;
            self.configured.store(true, Ordering::SeqCst);
        }

        fn fft_size(&self) -> usize {
            self.fft_size
        }

        fn byte_time_domain_data(&mut self, buffer: &mut [u8]) {
            self.seen.store(buffer.len(), Ordering::SeqCst);
        }
    }

    let indicator = VoiceActivityIndicator::spawn(
        Box::new(WindowRecorder {
            seen: seen.clone(),
            configured: configured.clone(),
            fft_size: 0,
        }),
        fast_config(),
        Arc::new(|_: bool| {}),
    );

    wait_until("first read", || seen.load(Ordering::SeqCst) > 0).await;
    assert!(configured.load(Ordering::SeqCst));
    assert_eq!(seen.load(Ordering::SeqCst), 1024);

    indicator.stop();
}
