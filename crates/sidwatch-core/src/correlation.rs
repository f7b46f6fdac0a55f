//! Solar-activity / VLF-disturbance correlation.
//!
//! Combines a space-weather snapshot with the aggregate disturbance
//! metrics from [`SignalHistory`](crate::SignalHistory) into a single
//! correlation verdict. The heuristic is deliberately simple: both sides
//! are normalized onto a 0–100 severity scale and the coefficient falls
//! off linearly with their disagreement.
//!
//! Pure and deterministic; safe to call from any thread.

use crate::timing::now_ms;
use crate::types::{CorrelationResult, Relationship, SolarActivitySnapshot, VlfAggregate};

/// K-index ceiling on the NOAA scale.
const K_INDEX_MAX: f64 = 9.0;

/// Solar flux value treated as 100% severity, in solar flux units.
const SOLAR_FLUX_SATURATION: f64 = 300.0;

/// Sample count at which confidence reaches 100 (a full day of minutes).
const FULL_CONFIDENCE_SAMPLES: f64 = 1440.0;

/// Correlates solar severity against VLF disturbance.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationEngine;

impl CorrelationEngine {
    /// Create a correlation engine.
    pub fn new() -> Self {
        Self
    }

    /// Correlate a solar snapshot with a VLF aggregate.
    pub fn correlate(
        &self,
        solar: SolarActivitySnapshot,
        vlf: VlfAggregate,
    ) -> CorrelationResult {
        let coefficient = self.coefficient(&solar, &vlf);
        let relationship = Relationship::from_coefficient(coefficient);
        let confidence =
            ((vlf.signal_count as f64 / FULL_CONFIDENCE_SAMPLES) * 100.0).clamp(0.0, 100.0);
        let summary = self.summary(&solar, &vlf, coefficient);

        CorrelationResult {
            timestamp_ms: now_ms(),
            solar,
            vlf,
            coefficient,
            relationship,
            confidence,
            summary,
        }
    }

    /// Combined solar severity on a 0–100 scale.
    pub fn solar_severity(&self, solar: &SolarActivitySnapshot) -> f64 {
        let normalized_k = (solar.k_index / K_INDEX_MAX) * 100.0;
        let normalized_flux = ((solar.solar_flux / SOLAR_FLUX_SATURATION) * 100.0).min(100.0);
        (normalized_k + normalized_flux) / 2.0
    }

    fn coefficient(&self, solar: &SolarActivitySnapshot, vlf: &VlfAggregate) -> f64 {
        let diff = (self.solar_severity(solar) - vlf.disturbance_index).abs();
        (1.0 - diff / 100.0).clamp(-1.0, 1.0)
    }

    fn summary(
        &self,
        solar: &SolarActivitySnapshot,
        vlf: &VlfAggregate,
        coefficient: f64,
    ) -> String {
        let solar_severity = if solar.k_index >= 7.0 {
            "severe"
        } else if solar.k_index >= 5.0 {
            "high"
        } else if solar.k_index >= 3.0 {
            "moderate"
        } else {
            "low"
        };
        let vlf_severity = if vlf.disturbance_index >= 70.0 {
            "severe"
        } else if vlf.disturbance_index >= 50.0 {
            "high"
        } else if vlf.disturbance_index >= 30.0 {
            "moderate"
        } else {
            "low"
        };

        if coefficient > 0.5 {
            format!(
                "Strong correlation detected: solar activity ({}) and VLF disturbances ({}) are closely related.",
                solar_severity, vlf_severity
            )
        } else if coefficient > 0.2 {
            "Moderate correlation: some relationship between solar activity and VLF signals observed.".to_string()
        } else {
            "Weak correlation: VLF disturbances may be caused by other factors besides current solar activity.".to_string()
        }
    }
}

impl Relationship {
    /// Classify a correlation coefficient.
    pub fn from_coefficient(coefficient: f64) -> Self {
        if coefficient >= 0.7 {
            Relationship::StrongPositive
        } else if coefficient >= 0.4 {
            Relationship::ModeratePositive
        } else if coefficient >= -0.4 {
            Relationship::Weak
        } else if coefficient >= -0.7 {
            Relationship::ModerateNegative
        } else {
            Relationship::StrongNegative
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::magnetic_storm_level;

    fn snapshot(k_index: f64, solar_flux: f64) -> SolarActivitySnapshot {
        SolarActivitySnapshot {
            timestamp_ms: 0,
            k_index,
            solar_flux,
            xray_class: "C1.0".to_string(),
            active_regions: 3,
            sunspots: 40,
            proton_flux: 0.2,
            electron_flux: 100.0,
            magnetic_storm: magnetic_storm_level(k_index).to_string(),
            source: "fixture".to_string(),
        }
    }

    fn aggregate(disturbance_index: f64, signal_count: usize) -> VlfAggregate {
        VlfAggregate {
            disturbance_index,
            average_amplitude_db: -40.0,
            peak_amplitude_db: -30.0,
            noise_level_db: -60.0,
            signal_count,
        }
    }

    #[test]
    fn matching_severity_gives_perfect_coefficient() {
        let engine = CorrelationEngine::new();
        // k=4.5/9 → 50, flux=150/300 → 50, severity 50.
        let solar = snapshot(4.5, 150.0);
        let result = engine.correlate(solar, aggregate(50.0, 1440));
        assert!((result.coefficient - 1.0).abs() < 1e-12);
        assert_eq!(result.relationship, Relationship::StrongPositive);
        assert!((result.confidence - 100.0).abs() < 1e-12);
        assert!(result.summary.starts_with("Strong correlation"));
    }

    #[test]
    fn opposite_severity_is_weak() {
        let engine = CorrelationEngine::new();
        // Severity 100 vs disturbance 0: coefficient 0.
        let result = engine.correlate(snapshot(9.0, 300.0), aggregate(0.0, 100));
        assert!((result.coefficient - 0.0).abs() < 1e-12);
        assert_eq!(result.relationship, Relationship::Weak);
    }

    #[test]
    fn solar_flux_saturates_at_300() {
        let engine = CorrelationEngine::new();
        let capped = engine.solar_severity(&snapshot(0.0, 300.0));
        let excess = engine.solar_severity(&snapshot(0.0, 3_000.0));
        assert!((capped - excess).abs() < 1e-12);
        assert!((capped - 50.0).abs() < 1e-12);
    }

    #[test]
    fn confidence_scales_with_sample_count() {
        let engine = CorrelationEngine::new();
        let solar = snapshot(2.0, 100.0);
        let r0 = engine.correlate(solar.clone(), aggregate(20.0, 0));
        let r720 = engine.correlate(solar.clone(), aggregate(20.0, 720));
        let r_full = engine.correlate(solar, aggregate(20.0, 2_000));
        assert_eq!(r0.confidence, 0.0);
        assert!((r720.confidence - 50.0).abs() < 1e-12);
        assert_eq!(r_full.confidence, 100.0);
    }

    #[test]
    fn relationship_thresholds() {
        use Relationship::*;
        assert_eq!(Relationship::from_coefficient(1.0), StrongPositive);
        assert_eq!(Relationship::from_coefficient(0.7), StrongPositive);
        assert_eq!(Relationship::from_coefficient(0.5), ModeratePositive);
        assert_eq!(Relationship::from_coefficient(0.4), ModeratePositive);
        assert_eq!(Relationship::from_coefficient(0.0), Weak);
        assert_eq!(Relationship::from_coefficient(-0.4), Weak);
        assert_eq!(Relationship::from_coefficient(-0.5), ModerateNegative);
        assert_eq!(Relationship::from_coefficient(-0.7), ModerateNegative);
        assert_eq!(Relationship::from_coefficient(-0.9), StrongNegative);
    }
}
