//! Bounded rolling history of scored signals.
//!
//! The monitor keeps the last day of measurements (1440 entries at one
//! sample per minute) in a capacity-bounded FIFO. On top of the raw
//! sequence it offers windowed averages, z-score anomaly detection, and
//! the aggregate disturbance metrics the correlation engine consumes.
//!
//! Statistics are recomputed per call. With the capacity bounded at a
//! day of minutes an O(n) pass is cheaper to maintain than incremental
//! variance bookkeeping.

use std::collections::VecDeque;

use crate::timing::{minutes_to_ms, now_ms};
use crate::types::{ScoredSignal, VlfAggregate};

/// Default capacity: 24 hours at one sample per minute.
pub const DEFAULT_CAPACITY: usize = 1440;

/// Minimum entries before anomaly detection produces results.
const ANOMALY_MIN_SAMPLES: usize = 10;

/// Capacity-bounded FIFO of scored signals with rolling statistics.
#[derive(Debug, Clone)]
pub struct SignalHistory {
    signals: VecDeque<ScoredSignal>,
    capacity: usize,
}

impl Default for SignalHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SignalHistory {
    /// Create a history bounded to `capacity` entries.
    ///
    /// A zero capacity is clamped to 1 so `append` always retains the
    /// latest signal.
    pub fn new(capacity: usize) -> Self {
        Self {
            signals: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of retained signals.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of retained signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// True if no signals are retained.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Append a signal, evicting the oldest entry once past capacity.
    pub fn append(&mut self, signal: ScoredSignal) {
        self.signals.push_back(signal);
        if self.signals.len() > self.capacity {
            self.signals.pop_front();
        }
    }

    /// Most recent signal, if any.
    pub fn latest(&self) -> Option<&ScoredSignal> {
        self.signals.back()
    }

    /// The last `n` signals, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ScoredSignal> {
        let start = self.signals.len().saturating_sub(n);
        self.signals.iter().skip(start).cloned().collect()
    }

    /// Drop all retained signals.
    pub fn clear(&mut self) {
        self.signals.clear();
    }

    /// Signals whose amplitude deviates more than `k` population standard
    /// deviations from the mean.
    ///
    /// Returns an empty set below 10 entries; with that little data the
    /// variance estimate flags ordinary jitter.
    pub fn anomalies(&self, k: f64) -> Vec<ScoredSignal> {
        if self.signals.len() < ANOMALY_MIN_SAMPLES {
            return Vec::new();
        }
        let (mean, std_dev) = self.amplitude_stats();
        self.signals
            .iter()
            .filter(|s| (s.amplitude_db - mean).abs() > k * std_dev)
            .cloned()
            .collect()
    }

    /// Mean amplitude (dB) over signals newer than `window_minutes` ago.
    ///
    /// Returns 0 when no signal falls inside the window.
    pub fn window_average(&self, window_minutes: u64) -> f64 {
        self.window_average_at(window_minutes, now_ms())
    }

    /// [`window_average`](Self::window_average) against an explicit "now",
    /// for deterministic tests.
    pub fn window_average_at(&self, window_minutes: u64, now_ms: u64) -> f64 {
        let cutoff = now_ms.saturating_sub(minutes_to_ms(window_minutes));
        let mut sum = 0.0;
        let mut count = 0_usize;
        for s in &self.signals {
            if s.timestamp_ms > cutoff {
                sum += s.amplitude_db;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Aggregate disturbance metrics over the retained signals.
    ///
    /// The disturbance index is the relative amplitude spread
    /// `stddev / |mean| · 100`, clamped to [0, 100]. Fewer than two
    /// signals, or a mean near zero driving the ratio non-finite, resolve
    /// to index 0; `signal_count` lets callers tell quiet from empty.
    pub fn aggregate(&self) -> VlfAggregate {
        let count = self.signals.len();
        if count == 0 {
            return VlfAggregate {
                disturbance_index: 0.0,
                average_amplitude_db: 0.0,
                peak_amplitude_db: 0.0,
                noise_level_db: 0.0,
                signal_count: 0,
            };
        }

        let (mean, std_dev) = self.amplitude_stats();
        let peak = self
            .signals
            .iter()
            .map(|s| s.amplitude_db)
            .fold(f64::NEG_INFINITY, f64::max);
        let noise = self.signals.iter().map(|s| s.noise_floor_db).sum::<f64>() / count as f64;

        let disturbance_index = if count < 2 {
            0.0
        } else {
            let index = (std_dev / mean.abs()) * 100.0;
            if index.is_finite() {
                index.min(100.0)
            } else {
                0.0
            }
        };

        VlfAggregate {
            disturbance_index,
            average_amplitude_db: mean,
            peak_amplitude_db: peak,
            noise_level_db: noise,
            signal_count: count,
        }
    }

    /// Mean and population standard deviation of `amplitude_db`.
    fn amplitude_stats(&self) -> (f64, f64) {
        let n = self.signals.len() as f64;
        let mean = self.signals.iter().map(|s| s.amplitude_db).sum::<f64>() / n;
        let variance = self
            .signals
            .iter()
            .map(|s| {
                let d = s.amplitude_db - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        (mean, variance.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(timestamp_ms: u64, amplitude_db: f64) -> ScoredSignal {
        ScoredSignal {
            timestamp_ms,
            frequency_hz: 24_000.0,
            amplitude_db,
            phase_deg: 0.0,
            snr_db: 10.0,
            quality: 50.0,
            raw_amplitude: 0.5,
            noise_floor_db: -60.0,
        }
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut history = SignalHistory::new(5);
        for i in 0..20 {
            history.append(signal(i, -40.0));
            assert!(history.len() <= 5);
        }
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn eviction_drops_exactly_the_oldest() {
        let mut history = SignalHistory::new(3);
        for i in 0..4 {
            history.append(signal(i, -40.0));
        }
        let kept: Vec<u64> = history.recent(10).iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(kept, vec![1, 2, 3]);
    }

    #[test]
    fn recent_returns_last_n_oldest_first() {
        let mut history = SignalHistory::new(10);
        for i in 0..6 {
            history.append(signal(i, -40.0));
        }
        let last_two: Vec<u64> = history.recent(2).iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(last_two, vec![4, 5]);
        assert_eq!(history.recent(100).len(), 6);
    }

    #[test]
    fn anomalies_need_ten_samples() {
        let mut history = SignalHistory::new(100);
        for i in 0..9 {
            history.append(signal(i, if i == 4 { 100.0 } else { -40.0 }));
        }
        assert!(history.anomalies(2.0).is_empty());
    }

    #[test]
    fn single_outlier_is_flagged() {
        let mut history = SignalHistory::new(100);
        // Tight cluster with mild jitter plus one far outlier.
        for i in 0..11 {
            let amp = -40.0 + (i as f64 % 3.0) * 0.1;
            history.append(signal(i, amp));
        }
        history.append(signal(99, 40.0));
        let found = history.anomalies(2.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].timestamp_ms, 99);
    }

    #[test]
    fn window_average_respects_cutoff() {
        let mut history = SignalHistory::new(100);
        let now = 10 * 60_000;
        history.append(signal(0, -80.0)); // 10 minutes old, outside 5-min window
        history.append(signal(now - 60_000, -40.0));
        history.append(signal(now - 30_000, -20.0));
        let avg = history.window_average_at(5, now);
        assert!((avg - (-30.0)).abs() < 1e-12);
    }

    #[test]
    fn window_average_empty_is_zero() {
        let history = SignalHistory::new(10);
        assert_eq!(history.window_average_at(60, 1_000_000), 0.0);

        let mut history = SignalHistory::new(10);
        history.append(signal(0, -40.0));
        // Everything is older than the window.
        assert_eq!(history.window_average_at(1, 1_000_000), 0.0);
    }

    #[test]
    fn aggregate_empty_history() {
        let history = SignalHistory::default();
        let agg = history.aggregate();
        assert_eq!(agg.signal_count, 0);
        assert_eq!(agg.disturbance_index, 0.0);
    }

    #[test]
    fn aggregate_constant_amplitudes_is_undisturbed() {
        let mut history = SignalHistory::new(100);
        for i in 0..5 {
            history.append(signal(i, -40.0));
        }
        let agg = history.aggregate();
        assert_eq!(agg.disturbance_index, 0.0);
        assert!((agg.average_amplitude_db - (-40.0)).abs() < 1e-12);
        assert!((agg.peak_amplitude_db - (-40.0)).abs() < 1e-12);
        assert_eq!(agg.signal_count, 5);
    }

    #[test]
    fn aggregate_near_zero_mean_resolves_to_zero() {
        let mut history = SignalHistory::new(100);
        history.append(signal(0, 5.0));
        history.append(signal(1, -5.0));
        // Mean is exactly zero; spread/|mean| is not finite.
        let agg = history.aggregate();
        assert_eq!(agg.disturbance_index, 0.0);
    }

    #[test]
    fn aggregate_index_is_clamped() {
        let mut history = SignalHistory::new(100);
        history.append(signal(0, -0.1));
        history.append(signal(1, -90.0));
        let agg = history.aggregate();
        assert!(agg.disturbance_index <= 100.0);
        assert!(agg.disturbance_index > 0.0);
    }
}
