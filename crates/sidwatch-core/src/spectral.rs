//! Windowed spectral transform for VLF monitoring.
//!
//! Turns one captured audio [`Frame`] into frequency-domain bins limited
//! to the usable VLF range (3–30 kHz). The transform chain is:
//!
//! ```text
//! left channel → truncate / zero-pad to N → Hann window → FFT → bins
//! ```
//!
//! A Hann window is applied before the transform to reduce spectral
//! leakage from the frame boundaries; at 96 kHz with N = 4096 the bin
//! width is about 23.4 Hz, comfortably finer than the 2 kHz monitoring
//! band.
//!
//! ## Example
//!
//! ```rust
//! use sidwatch_core::spectral::SpectralAnalyzer;
//! use sidwatch_core::types::Frame;
//!
//! let mut analyzer = SpectralAnalyzer::new(96_000.0, 4096).unwrap();
//! let frame = Frame::mono(0, 96_000.0, vec![0.0; 4096]);
//! let bins = analyzer.analyze(&frame);
//! assert!(bins.iter().all(|b| b.frequency_hz >= 3_000.0 && b.frequency_hz <= 30_000.0));
//! ```

use std::fmt;
use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::config::ConfigError;
use crate::types::{Frame, SpectrumBin};
use crate::{VLF_MAX_HZ, VLF_MIN_HZ};

/// Reference offset added before `log10` so silent bins map to a finite
/// floor instead of −∞.
pub const DB_EPSILON: f64 = 1e-10;

/// Fixed-size forward FFT over audio frames, restricted to the VLF range.
pub struct SpectralAnalyzer {
    /// Sample rate in Hz.
    sample_rate: f64,
    /// Transform size (power of two).
    fft_size: usize,
    /// Planned forward FFT instance.
    fft: Arc<dyn Fft<f64>>,
    /// Scratch buffer reused across transforms.
    scratch: Vec<Complex64>,
    /// Precomputed Hann window coefficients.
    window: Vec<f64>,
}

impl fmt::Debug for SpectralAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralAnalyzer")
            .field("sample_rate", &self.sample_rate)
            .field("fft_size", &self.fft_size)
            .finish()
    }
}

impl SpectralAnalyzer {
    /// Create an analyzer for the given sample rate and transform size.
    ///
    /// Fails at construction, never at call time: `sample_rate` must be
    /// positive and `fft_size` a power of two.
    pub fn new(sample_rate: f64, fft_size: usize) -> Result<Self, ConfigError> {
        if sample_rate <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        if fft_size == 0 || !fft_size.is_power_of_two() {
            return Err(ConfigError::ValidationError(format!(
                "fft size must be a power of two, got {}",
                fft_size
            )));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        // Hann window: w[i] = 0.5 * (1 - cos(2πi / (L-1)))
        let denom = (fft_size - 1).max(1) as f64;
        let window: Vec<f64> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / denom).cos()))
            .collect();

        Ok(Self {
            sample_rate,
            fft_size,
            fft,
            scratch,
            window,
        })
    }

    /// Sample rate this analyzer was built for, Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Transform size.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Frequency spacing between adjacent bins, Hz.
    pub fn bin_width_hz(&self) -> f64 {
        self.sample_rate / self.fft_size as f64
    }

    /// Transform one frame into VLF-range spectrum bins.
    ///
    /// Uses the left channel. Input longer than the transform size is
    /// truncated; shorter input is zero-padded on the right. The returned
    /// bins are strictly increasing in frequency and bounded to
    /// [3000, 30000] Hz.
    pub fn analyze(&mut self, frame: &Frame) -> Vec<SpectrumBin> {
        let n = self.fft_size;
        let mut buffer: Vec<Complex64> = frame
            .left
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, &s)| Complex64::new(s as f64 * self.window[i], 0.0))
            .collect();
        buffer.resize(n, Complex64::new(0.0, 0.0));

        self.fft.process_with_scratch(&mut buffer, &mut self.scratch);

        let freq_resolution = self.sample_rate / n as f64;
        let mut bins = Vec::new();
        // Only the first N/2 bins carry unique information for real input.
        for (i, c) in buffer.iter().take(n / 2).enumerate() {
            let frequency_hz = i as f64 * freq_resolution;
            if frequency_hz < VLF_MIN_HZ {
                continue;
            }
            if frequency_hz > VLF_MAX_HZ {
                break;
            }
            bins.push(SpectrumBin {
                frequency_hz,
                magnitude: c.norm(),
                phase_deg: c.arg().to_degrees(),
            });
        }
        bins
    }
}

/// Linear magnitude to dB with the ε floor: `20·log10(mag + 1e-10)`.
///
/// Used for spectrum display and diagnostics; the scoring path applies
/// its own −100 dB sentinel instead.
pub fn magnitude_db(magnitude: f64) -> f64 {
    20.0 * (magnitude + DB_EPSILON).log10()
}
