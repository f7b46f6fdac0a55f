//! Space-weather provider abstraction.
//!
//! Correlation needs an independent view of solar conditions. A real
//! deployment polls NOAA SWPC (planetary K-index, 10.7 cm flux, GOES
//! X-ray class, proton/electron flux); retry and caching policy belong
//! to that client, not to this crate. The trait here is the narrow seam
//! the orchestrator correlates against, and [`FixtureProvider`] serves
//! configured snapshots for tests and offline work.

use sidwatch_core::timing::now_ms;
use sidwatch_core::types::{magnetic_storm_level, SolarActivitySnapshot};

/// Errors from a space-weather provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SpaceWeatherError {
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed upstream data: {0}")]
    Malformed(String),
}

/// Source of current solar-activity snapshots.
pub trait SpaceWeatherProvider: Send {
    /// Fetch the current snapshot.
    fn fetch_current(&mut self) -> Result<SolarActivitySnapshot, SpaceWeatherError>;
}

/// Provider that returns a configured snapshot, for tests and offline use.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    snapshot: SolarActivitySnapshot,
}

impl FixtureProvider {
    /// Serve the given snapshot from every fetch.
    pub fn new(snapshot: SolarActivitySnapshot) -> Self {
        Self { snapshot }
    }

    /// Quiet-sun conditions: low K-index, baseline flux.
    pub fn quiet_sun() -> Self {
        Self::new(snapshot(1.0, 70.0, "A1.0"))
    }

    /// Active conditions: strong storm, elevated flux, M-class flare.
    pub fn active_sun() -> Self {
        Self::new(snapshot(6.0, 220.0, "M5.0"))
    }

    /// Replace the served snapshot.
    pub fn set_snapshot(&mut self, snapshot: SolarActivitySnapshot) {
        self.snapshot = snapshot;
    }
}

fn snapshot(k_index: f64, solar_flux: f64, xray_class: &str) -> SolarActivitySnapshot {
    SolarActivitySnapshot {
        timestamp_ms: now_ms(),
        k_index,
        solar_flux,
        xray_class: xray_class.to_string(),
        active_regions: 2,
        sunspots: 35,
        proton_flux: 0.3,
        electron_flux: 250.0,
        magnetic_storm: magnetic_storm_level(k_index).to_string(),
        source: "fixture".to_string(),
    }
}

impl SpaceWeatherProvider for FixtureProvider {
    fn fetch_current(&mut self) -> Result<SolarActivitySnapshot, SpaceWeatherError> {
        let mut snapshot = self.snapshot.clone();
        snapshot.timestamp_ms = now_ms();
        Ok(snapshot)
    }
}
