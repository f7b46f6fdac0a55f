//! Decibel-domain signal scoring.
//!
//! Converts a band extraction into a [`ScoredSignal`]: linear amplitudes
//! become dB, SNR is the difference against the noise floor, and a
//! bounded quality index maps SNR onto [0, 100]. The mapping is
//! calibrated so −10 dB SNR scores 0 and 30 dB scores 100.
//!
//! Pure and deterministic; quiet or silent input resolves to sentinel
//! values, never to an error.

use crate::band::BandPeak;
use crate::types::ScoredSignal;

/// dB value used for non-positive linear amplitude.
pub const SILENCE_DB: f64 = -100.0;

/// Linear amplitude to dB with the −100 dB silence sentinel.
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    if amplitude > 0.0 {
        20.0 * amplitude.log10()
    } else {
        SILENCE_DB
    }
}

/// Quality index in [0, 100] for a given SNR in dB.
pub fn quality_index(snr_db: f64) -> f64 {
    ((snr_db + 10.0) * 2.5).clamp(0.0, 100.0)
}

/// Score one band extraction at the given capture time.
pub fn score(peak: &BandPeak, timestamp_ms: u64) -> ScoredSignal {
    let amplitude_db = amplitude_to_db(peak.amplitude);
    let noise_floor_db = amplitude_to_db(peak.noise_floor);
    let snr_db = amplitude_db - noise_floor_db;

    ScoredSignal {
        timestamp_ms,
        frequency_hz: peak.frequency_hz,
        amplitude_db,
        phase_deg: peak.phase_deg,
        snr_db,
        quality: quality_index(snr_db),
        raw_amplitude: peak.amplitude,
        noise_floor_db,
    }
}
