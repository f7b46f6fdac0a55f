//! Simulated audio source.
//!
//! Generates the signal a VLF receiver would deliver: a carrier tone
//! (default 24 kHz at amplitude 0.5, the NAA transmitter as heard by a
//! 96 kHz sound card) plus additive white Gaussian noise. Useful for
//! development and tests without an antenna on the roof.
//!
//! The generator is phase-continuous across frames and deterministic for
//! a given seed, so tests can assert exact pipeline behavior.

use std::f64::consts::PI;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use sidwatch_core::timing::now_ms;
use sidwatch_core::types::Frame;

use crate::audio::{AudioSource, CaptureError, CaptureResult};

/// Configuration for the simulated receiver.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Samples per frame.
    pub frame_size: usize,
    /// Carrier frequency in Hz.
    pub tone_hz: f64,
    /// Carrier amplitude, linear in [0, 1].
    pub tone_amplitude: f64,
    /// Standard deviation of the additive Gaussian noise.
    pub noise_sigma: f64,
    /// RNG seed for reproducible noise.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sample_rate: 96_000.0,
            frame_size: 4096,
            tone_hz: 24_000.0,
            tone_amplitude: 0.5,
            noise_sigma: 0.001,
            seed: 0,
        }
    }
}

/// Tone-plus-noise frame generator implementing [`AudioSource`].
pub struct SimulatedAudioSource {
    config: SimConfig,
    rng: StdRng,
    noise: Normal<f64>,
    /// Carrier phase carried across frames, radians.
    phase: f64,
    capturing: bool,
    /// When set, `start_capture` fails; used to exercise error paths.
    fail_start: bool,
}

impl SimulatedAudioSource {
    /// Create a simulator with the given configuration.
    pub fn new(config: SimConfig) -> Self {
        let noise = Normal::new(0.0, config.noise_sigma.max(f64::MIN_POSITIVE))
            .unwrap_or_else(|_| Normal::new(0.0, 1e-6).unwrap());
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            noise,
            phase: 0.0,
            capturing: false,
            fail_start: false,
        }
    }

    /// Make the next `start_capture` fail as if the device were missing.
    pub fn fail_next_start(&mut self) {
        self.fail_start = true;
    }

    /// The simulator configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn generate_frame(&mut self) -> Frame {
        let n = self.config.frame_size;
        let omega = 2.0 * PI * self.config.tone_hz / self.config.sample_rate;
        let mut left = Vec::with_capacity(n);
        let mut right = Vec::with_capacity(n);
        for _ in 0..n {
            let tone = self.config.tone_amplitude * self.phase.sin();
            left.push((tone + self.noise.sample(&mut self.rng)) as f32);
            right.push((tone + self.noise.sample(&mut self.rng)) as f32);
            self.phase += omega;
        }
        // Keep the accumulated phase bounded over long runs.
        self.phase %= 2.0 * PI;

        Frame {
            captured_at_ms: now_ms(),
            sample_rate: self.config.sample_rate,
            left,
            right,
        }
    }
}

impl AudioSource for SimulatedAudioSource {
    fn name(&self) -> &str {
        "sidwatch simulated receiver"
    }

    fn start_capture(&mut self) -> CaptureResult<()> {
        if self.capturing {
            return Err(CaptureError::AlreadyCapturing);
        }
        if self.fail_start {
            self.fail_start = false;
            return Err(CaptureError::DeviceUnavailable(
                "simulated device failure".to_string(),
            ));
        }
        self.capturing = true;
        Ok(())
    }

    fn stop_capture(&mut self) -> CaptureResult<()> {
        if !self.capturing {
            return Err(CaptureError::NotCapturing);
        }
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn next_frame(&mut self, _timeout: Duration) -> CaptureResult<Frame> {
        if !self.capturing {
            return Err(CaptureError::NotCapturing);
        }
        Ok(self.generate_frame())
    }
}
