//! Band-limited peak and noise-floor extraction.
//!
//! A SID monitor tracks one narrow transmitter band inside the VLF
//! spectrum (by default 20–26 kHz around the 24 kHz NAA carrier). This
//! module scans the analyzer's bin output for the strongest in-band bin
//! and estimates the noise floor as the mean magnitude of everything
//! outside the band.

use serde::{Deserialize, Serialize};

use crate::types::SpectrumBin;

/// Noise floor used when no out-of-band bins exist, so downstream SNR
/// math never divides by zero.
pub const DEFAULT_NOISE_FLOOR: f64 = 0.01;

/// Monitored frequency band.
///
/// Center and bandwidth describe the transmitter being tracked; the
/// explicit min/max edges define the extraction window. The defaults
/// track a 24 kHz carrier within a 20–26 kHz window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    /// Transmitter center frequency in Hz.
    pub center_hz: f64,
    /// Nominal transmitter bandwidth in Hz.
    pub bandwidth_hz: f64,
    /// Lower edge of the extraction window in Hz.
    pub min_hz: f64,
    /// Upper edge of the extraction window in Hz.
    pub max_hz: f64,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            center_hz: 24_000.0,
            bandwidth_hz: 2_000.0,
            min_hz: 20_000.0,
            max_hz: 26_000.0,
        }
    }
}

/// In-band peak plus out-of-band noise estimate, all linear magnitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPeak {
    /// Frequency of the strongest in-band bin, Hz.
    pub frequency_hz: f64,
    /// Linear magnitude of the strongest in-band bin.
    pub amplitude: f64,
    /// Phase at the peak bin, degrees.
    pub phase_deg: f64,
    /// Mean linear magnitude of out-of-band bins.
    pub noise_floor: f64,
}

/// Scans spectrum bins for the in-band peak and out-of-band noise floor.
#[derive(Debug, Clone)]
pub struct BandExtractor {
    config: BandConfig,
}

impl BandExtractor {
    /// Create an extractor for the given band.
    pub fn new(config: BandConfig) -> Self {
        Self { config }
    }

    /// The configured band.
    pub fn config(&self) -> &BandConfig {
        &self.config
    }

    /// Extract the in-band peak and out-of-band noise floor.
    ///
    /// If the band holds no bins at all (misconfiguration relative to the
    /// sample rate and transform size), the result degrades to the band
    /// center with zero amplitude rather than an error. If there are no
    /// out-of-band bins, the noise floor falls back to
    /// [`DEFAULT_NOISE_FLOOR`].
    pub fn extract(&self, bins: &[SpectrumBin]) -> BandPeak {
        let mut peak_frequency = self.config.center_hz;
        let mut peak_amplitude = 0.0_f64;
        let mut peak_phase = 0.0_f64;

        let mut noise_sum = 0.0_f64;
        let mut noise_count = 0_usize;

        for bin in bins {
            let in_band = bin.frequency_hz >= self.config.min_hz
                && bin.frequency_hz <= self.config.max_hz;
            if in_band {
                if bin.magnitude > peak_amplitude {
                    peak_amplitude = bin.magnitude;
                    peak_frequency = bin.frequency_hz;
                    peak_phase = bin.phase_deg;
                }
            } else {
                noise_sum += bin.magnitude;
                noise_count += 1;
            }
        }

        let noise_floor = if noise_count > 0 {
            noise_sum / noise_count as f64
        } else {
            DEFAULT_NOISE_FLOOR
        };

        BandPeak {
            frequency_hz: peak_frequency,
            amplitude: peak_amplitude,
            phase_deg: peak_phase,
            noise_floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(frequency_hz: f64, magnitude: f64) -> SpectrumBin {
        SpectrumBin {
            frequency_hz,
            magnitude,
            phase_deg: 0.0,
        }
    }

    #[test]
    fn finds_in_band_peak() {
        let extractor = BandExtractor::new(BandConfig::default());
        let bins = vec![
            bin(5_000.0, 0.3),
            bin(21_000.0, 0.2),
            bin(24_000.0, 0.9),
            bin(25_000.0, 0.4),
            bin(29_000.0, 0.1),
        ];
        let peak = extractor.extract(&bins);
        assert_eq!(peak.frequency_hz, 24_000.0);
        assert_eq!(peak.amplitude, 0.9);
        // Noise floor averages the 5 kHz and 29 kHz bins.
        assert!((peak.noise_floor - 0.2).abs() < 1e-12);
    }

    #[test]
    fn no_out_of_band_bins_uses_default_floor() {
        let extractor = BandExtractor::new(BandConfig::default());
        let bins = vec![bin(23_000.0, 0.5), bin(24_000.0, 0.7)];
        let peak = extractor.extract(&bins);
        assert_eq!(peak.noise_floor, DEFAULT_NOISE_FLOOR);
    }

    #[test]
    fn empty_band_degrades_to_center() {
        let extractor = BandExtractor::new(BandConfig::default());
        // Everything below the band: degenerate but not an error.
        let bins = vec![bin(5_000.0, 0.3), bin(9_000.0, 0.2)];
        let peak = extractor.extract(&bins);
        assert_eq!(peak.frequency_hz, 24_000.0);
        assert_eq!(peak.amplitude, 0.0);
        assert!(peak.noise_floor > 0.0);
    }

    #[test]
    fn empty_spectrum_degrades_to_center_with_default_floor() {
        let extractor = BandExtractor::new(BandConfig::default());
        let peak = extractor.extract(&[]);
        assert_eq!(peak.frequency_hz, 24_000.0);
        assert_eq!(peak.amplitude, 0.0);
        assert_eq!(peak.noise_floor, DEFAULT_NOISE_FLOOR);
    }
}
