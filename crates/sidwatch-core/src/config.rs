//! # Configuration System
//!
//! YAML-based configuration for a SID monitoring station:
//!
//! - Audio capture settings (sample rate, channels, frame size)
//! - Spectral transform size
//! - Monitored frequency band
//! - History capacity and sampling cadence
//! - Logging configuration
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `SIDWATCH_CONFIG` environment variable
//! 2. `./sidwatch.yaml` (current directory)
//! 3. `~/.config/sidwatch/config.yaml` (user config)
//! 4. `/etc/sidwatch/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! audio:
//!   sample_rate: 96000.0
//!   channels: 2
//!   frame_size: 4096
//!
//! spectral:
//!   fft_size: 4096
//!
//! band:
//!   center_hz: 24000.0
//!   min_hz: 20000.0
//!   max_hz: 26000.0
//!
//! sampling:
//!   interval_secs: 60
//!   history_capacity: 1440
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::band::BandConfig;
use crate::observe::LogConfig;

/// Error type for configuration operations.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found
    NotFound(String),
    /// Failed to read configuration file
    ReadError(String),
    /// Failed to parse configuration
    ParseError(String),
    /// Invalid configuration value
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(msg) => write!(f, "config not found: {}", msg),
            ConfigError::ReadError(msg) => write!(f, "failed to read config: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "failed to parse config: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Channel count (2 for the stereo VLF receivers SuperSID uses)
    pub channels: u8,
    /// Samples per captured frame
    pub frame_size: usize,
    /// Optional specific capture device identifier
    pub device_id: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 96_000.0,
            channels: 2,
            frame_size: 4096,
            device_id: None,
        }
    }
}

/// Spectral transform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// FFT size, must be a power of two
    pub fft_size: usize,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self { fft_size: 4096 }
    }
}

/// Sampling cadence and history retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Seconds between samples (SuperSID cadence: one per minute)
    pub interval_secs: u64,
    /// Maximum retained scored signals
    pub history_capacity: usize,
    /// Per-tick frame wait budget in milliseconds
    pub capture_timeout_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            history_capacity: 1440,
            capture_timeout_ms: 5_000,
        }
    }
}

/// Top-level sidwatch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SidwatchConfig {
    /// Audio capture settings
    pub audio: AudioConfig,
    /// Spectral transform settings
    pub spectral: SpectralConfig,
    /// Monitored frequency band
    pub band: BandConfig,
    /// Sampling cadence and retention
    pub sampling: SamplingConfig,
    /// Logging settings
    pub logging: LogConfig,
}

impl SidwatchConfig {
    /// Load configuration from the standard search path.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("SIDWATCH_CONFIG") {
            return Self::load_from(Path::new(&path));
        }
        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Check invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.sample_rate <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "sample rate must be positive, got {}",
                self.audio.sample_rate
            )));
        }
        if self.spectral.fft_size == 0 || !self.spectral.fft_size.is_power_of_two() {
            return Err(ConfigError::ValidationError(format!(
                "fft size must be a power of two, got {}",
                self.spectral.fft_size
            )));
        }
        if self.band.min_hz >= self.band.max_hz {
            return Err(ConfigError::ValidationError(format!(
                "band min {} must be below band max {}",
                self.band.min_hz, self.band.max_hz
            )));
        }
        if self.sampling.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sampling interval must be at least one second".to_string(),
            ));
        }
        if self.sampling.history_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "history capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("sidwatch.yaml")];
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("sidwatch")
                    .join("config.yaml"),
            );
        }
        paths.push(PathBuf::from("/etc/sidwatch/config.yaml"));
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = SidwatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.audio.sample_rate, 96_000.0);
        assert_eq!(config.spectral.fft_size, 4096);
        assert_eq!(config.sampling.interval_secs, 60);
        assert_eq!(config.sampling.history_capacity, 1440);
    }

    #[test]
    fn yaml_round_trip() {
        let config = SidwatchConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed: SidwatchConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.band.center_hz, config.band.center_hz);
        assert_eq!(parsed.sampling.history_capacity, 1440);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "sampling:\n  interval_secs: 5\n";
        let config: SidwatchConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sampling.interval_secs, 5);
        assert_eq!(config.audio.sample_rate, 96_000.0);
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = SidwatchConfig::default();
        config.spectral.fft_size = 4095;
        assert!(config.validate().is_err());

        let mut config = SidwatchConfig::default();
        config.audio.sample_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = SidwatchConfig::default();
        config.band.min_hz = 27_000.0;
        assert!(config.validate().is_err());

        let mut config = SidwatchConfig::default();
        config.sampling.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_missing_path_is_not_found() {
        let err = SidwatchConfig::load_from(Path::new("/nonexistent/sidwatch.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sidwatch.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "band:\n  center_hz: 19800.0\n  min_hz: 18000.0\n  max_hz: 21000.0").unwrap();
        let config = SidwatchConfig::load_from(&path).unwrap();
        assert_eq!(config.band.center_hz, 19_800.0);
    }
}
