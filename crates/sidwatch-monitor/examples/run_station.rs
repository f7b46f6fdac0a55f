//! Run one simulated monitoring station for a few fast ticks and print
//! the resulting correlation verdict.
//!
//! ```sh
//! cargo run --example run_station
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sidwatch_core::config::SidwatchConfig;
use sidwatch_core::observe::init_logging;
use sidwatch_monitor::monitor::MonitorOrchestrator;
use sidwatch_monitor::sim::{SimConfig, SimulatedAudioSource};
use sidwatch_monitor::spaceweather::{FixtureProvider, SpaceWeatherProvider};
use sidwatch_monitor::store::MemoryStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SidwatchConfig::default();
    config.sampling.interval_secs = 1;
    init_logging(&config.logging);

    let source = Box::new(SimulatedAudioSource::new(SimConfig::default()));
    let store = Arc::new(MemoryStore::new());
    let mut monitor = MonitorOrchestrator::new(1, config, source, store)?;

    monitor.start()?;
    thread::sleep(Duration::from_secs(5));
    monitor.stop()?;

    let status = monitor.status();
    println!(
        "processed {} samples, last amplitude {:.1} dB",
        status.samples_processed,
        status
            .last_sample
            .as_ref()
            .map(|s| s.amplitude_db)
            .unwrap_or(f64::NAN)
    );

    let snapshot = FixtureProvider::active_sun().fetch_current()?;
    let verdict = monitor.correlate(snapshot);
    println!(
        "correlation {:.2} ({}) at {:.0}% confidence: {}",
        verdict.coefficient, verdict.relationship, verdict.confidence, verdict.summary
    );
    Ok(())
}
