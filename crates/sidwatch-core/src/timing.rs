//! Wall-clock helpers.
//!
//! The pipeline timestamps everything in Unix epoch milliseconds, matching
//! what the persistence layer and space-weather feeds use. Sample-accurate
//! DSP timing is not needed at a one-sample-per-minute cadence.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall time as Unix epoch milliseconds.
///
/// Saturates to 0 if the system clock reads before the epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Convert a window length in minutes to milliseconds.
pub fn minutes_to_ms(minutes: u64) -> u64 {
    minutes * 60_000
}
