//! Shared data types for the VLF monitoring pipeline.
//!
//! Everything the pipeline passes between stages lives here: raw audio
//! frames, ephemeral spectrum bins, scored signals, solar-activity
//! snapshots, and the correlation verdict.

use serde::{Deserialize, Serialize};

/// One fixed-size dual-channel audio capture.
///
/// Produced by an audio source, consumed exactly once by the spectral
/// analyzer, never retained. The left channel carries the VLF antenna
/// signal; the right channel is kept only for stereo diagnostics.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Capture time, Unix epoch milliseconds.
    pub captured_at_ms: u64,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Left channel samples, normalized to [-1.0, 1.0].
    pub left: Vec<f32>,
    /// Right channel samples, normalized to [-1.0, 1.0].
    pub right: Vec<f32>,
}

impl Frame {
    /// Create a frame where the right channel mirrors the left.
    pub fn mono(captured_at_ms: u64, sample_rate: f64, left: Vec<f32>) -> Self {
        let right = left.clone();
        Self {
            captured_at_ms,
            sample_rate,
            left,
            right,
        }
    }
}

/// A single frequency-domain bin.
///
/// Ephemeral, per-frame output of the spectral analyzer. Magnitude is
/// linear; decibel conversion happens at scoring time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumBin {
    /// Bin center frequency in Hz.
    pub frequency_hz: f64,
    /// Linear magnitude `sqrt(re² + im²)`.
    pub magnitude: f64,
    /// Phase in degrees, from `atan2(im, re)`.
    pub phase_deg: f64,
}

/// One fully scored VLF measurement.
///
/// Immutable once created; appended to [`SignalHistory`](crate::SignalHistory)
/// and persisted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSignal {
    /// Measurement time, Unix epoch milliseconds.
    pub timestamp_ms: u64,
    /// Peak frequency within the monitored band, Hz.
    pub frequency_hz: f64,
    /// Peak amplitude in dB (−100 sentinel for silence).
    pub amplitude_db: f64,
    /// Phase at the peak bin, degrees.
    pub phase_deg: f64,
    /// Signal-to-noise ratio in dB.
    pub snr_db: f64,
    /// Quality index in [0, 100], derived from SNR.
    pub quality: f64,
    /// Raw linear peak amplitude before dB conversion.
    pub raw_amplitude: f64,
    /// Estimated noise floor in dB.
    pub noise_floor_db: f64,
}

/// Snapshot of solar and geomagnetic conditions from a space-weather
/// provider (NOAA SWPC or similar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarActivitySnapshot {
    /// Snapshot time, Unix epoch milliseconds.
    pub timestamp_ms: u64,
    /// Planetary K-index, 0–9 geomagnetic disturbance scale.
    pub k_index: f64,
    /// 10.7 cm solar radio flux in solar flux units.
    pub solar_flux: f64,
    /// GOES X-ray flare class (e.g. "C1.2", "M5.0", "X2.1").
    pub xray_class: String,
    /// Number of active sunspot regions.
    pub active_regions: u32,
    /// Sunspot number.
    pub sunspots: u32,
    /// Proton flux in pfu.
    pub proton_flux: f64,
    /// Electron flux in pfu.
    pub electron_flux: f64,
    /// Storm level derived from the K-index, see [`magnetic_storm_level`].
    pub magnetic_storm: String,
    /// Data source identifier.
    pub source: String,
}

/// Classify a K-index into a geomagnetic storm level.
pub fn magnetic_storm_level(k_index: f64) -> &'static str {
    if k_index >= 9.0 {
        "Extreme"
    } else if k_index >= 7.0 {
        "Severe"
    } else if k_index >= 6.0 {
        "Strong"
    } else if k_index >= 5.0 {
        "Moderate"
    } else if k_index >= 4.0 {
        "Minor"
    } else {
        "None"
    }
}

/// Aggregate disturbance metrics over a window of scored signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VlfAggregate {
    /// Relative disturbance index in [0, 100]
    /// (`stddev / |mean| · 100`, clamped; 0 with fewer than 2 signals).
    pub disturbance_index: f64,
    /// Mean amplitude over the window, dB.
    pub average_amplitude_db: f64,
    /// Maximum amplitude over the window, dB.
    pub peak_amplitude_db: f64,
    /// Mean noise floor over the window, dB.
    pub noise_level_db: f64,
    /// Number of signals in the window.
    pub signal_count: usize,
}

/// Strength and direction of the solar/VLF relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    /// Coefficient ≥ 0.7.
    StrongPositive,
    /// Coefficient in [0.4, 0.7).
    ModeratePositive,
    /// Coefficient in [−0.4, 0.4).
    Weak,
    /// Coefficient in [−0.7, −0.4).
    ModerateNegative,
    /// Coefficient < −0.7.
    StrongNegative,
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Relationship::StrongPositive => "strong-positive",
            Relationship::ModeratePositive => "moderate-positive",
            Relationship::Weak => "weak",
            Relationship::ModerateNegative => "moderate-negative",
            Relationship::StrongNegative => "strong-negative",
        };
        write!(f, "{}", s)
    }
}

/// Verdict of correlating VLF disturbance against solar activity.
///
/// Produced on demand by [`CorrelationEngine`](crate::CorrelationEngine);
/// not persisted internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Analysis time, Unix epoch milliseconds.
    pub timestamp_ms: u64,
    /// The solar-activity snapshot that was correlated.
    pub solar: SolarActivitySnapshot,
    /// The VLF aggregate that was correlated.
    pub vlf: VlfAggregate,
    /// Correlation coefficient in [−1, 1].
    pub coefficient: f64,
    /// Thresholded relationship classification.
    pub relationship: Relationship,
    /// Confidence in [0, 100], driven by sample count.
    pub confidence: f64,
    /// Human-readable one-line interpretation.
    pub summary: String,
}
