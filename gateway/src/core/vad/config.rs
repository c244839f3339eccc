//! VAD configuration types

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration for the local voice activity indicator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VADConfig {
    /// Enable/disable the indicator
    pub enabled: bool,

    /// RMS threshold above which the user counts as talking (0.0 - 1.0)
    /// Empirical value, tuned for a close-talking microphone
    pub threshold: f32,

    /// Analyzer window in samples (power of two, 32 - 32768)
    pub fft_size: usize,

    /// Interval between two frame reads, roughly one display refresh (ms)
    pub tick_interval_ms: u64,
}

impl Default for VADConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.03,
            fft_size: 1024,
            tick_interval_ms: 16,
        }
    }
}

impl VADConfig {
    /// Create a new VADConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame read interval as a `Duration`
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            anyhow::bail!("VAD threshold must be between 0.0 and 1.0");
        }
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            anyhow::bail!("VAD fft_size must be a power of two between 32 and 32768");
        }
        if self.tick_interval_ms == 0 {
            anyhow::bail!("VAD tick_interval_ms must be greater than 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VADConfig::default();
        assert!(config.enabled);
        assert_eq!(config.threshold, 0.03);
        assert_eq!(config.fft_size, 1024);
        assert_eq!(config.tick_interval_ms, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = VADConfig::default();
        config.threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = VADConfig::default();
        config.fft_size = 1000;
        assert!(config.validate().is_err());

        let mut config = VADConfig::default();
        config.fft_size = 16;
        assert!(config.validate().is_err());

        let mut config = VADConfig::default();
        config.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }
}
