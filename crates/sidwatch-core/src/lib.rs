//! # SID Watch Core Library
//!
//! Core DSP and analysis for detecting Sudden Ionospheric Disturbances (SID)
//! by monitoring Very Low Frequency (VLF, 3–30 kHz) transmitter signals.
//!
//! ## Overview
//!
//! Solar flares ionize the upper atmosphere and abruptly change how VLF
//! radio waves propagate. A receiver tuned to a distant VLF transmitter
//! (for example NAA at 24 kHz) sees a sudden amplitude step when a flare
//! hits. This crate implements the acquisition-to-score pipeline for one
//! monitored station:
//!
//! ```text
//! Frame → SpectralAnalyzer → BandExtractor → score() → SignalHistory
//!         (Hann + FFT,       (in-band peak,  (dB, SNR,  (bounded FIFO,
//!          3–30 kHz bins)     noise floor)    quality)   anomalies)
//!                                                            │
//!                              SolarActivitySnapshot ──► CorrelationEngine
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sidwatch_core::{BandConfig, BandExtractor, SpectralAnalyzer};
//! use sidwatch_core::scoring::score;
//! use sidwatch_core::types::Frame;
//!
//! let mut analyzer = SpectralAnalyzer::new(96_000.0, 4096).unwrap();
//! let extractor = BandExtractor::new(BandConfig::default());
//!
//! // A pure 24 kHz tone, as captured from the sound card.
//! let left: Vec<f32> = (0..4096)
//!     .map(|i| {
//!         let t = i as f64 / 96_000.0;
//!         (0.5 * (2.0 * std::f64::consts::PI * 24_000.0 * t).sin()) as f32
//!     })
//!     .collect();
//! let frame = Frame::mono(0, 96_000.0, left);
//!
//! let bins = analyzer.analyze(&frame);
//! let peak = extractor.extract(&bins);
//! let signal = score(&peak, frame.captured_at_ms);
//! assert!(signal.snr_db > 0.0);
//! ```

pub mod band;
pub mod config;
pub mod correlation;
pub mod history;
pub mod observe;
pub mod scoring;
pub mod spectral;
pub mod timing;
pub mod types;

pub use band::{BandConfig, BandExtractor, BandPeak};
pub use config::{ConfigError, SidwatchConfig};
pub use correlation::CorrelationEngine;
pub use history::SignalHistory;
pub use spectral::SpectralAnalyzer;
pub use types::{
    CorrelationResult, Frame, Relationship, ScoredSignal, SolarActivitySnapshot, SpectrumBin,
    VlfAggregate,
};

/// Lower edge of the usable VLF range in Hz.
pub const VLF_MIN_HZ: f64 = 3_000.0;

/// Upper edge of the usable VLF range in Hz.
pub const VLF_MAX_HZ: f64 = 30_000.0;
