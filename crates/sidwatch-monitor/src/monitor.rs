//! Per-station monitoring orchestrator.
//!
//! Drives the full pipeline for one station: a sampling thread pulls one
//! frame per tick from the audio source, runs it through
//! analyze → extract → score synchronously, appends the result to the
//! rolling history, and hands it to a persistence writer thread. The
//! writer keeps store latency and store failures off the sampling path.
//!
//! ## State machine
//!
//! ```text
//! Stopped ──start()──► Starting ──► Running
//!    ▲                    │            │
//!    │          capture failure      stop()
//!    │                    │            │
//!    └────────────────────┴── Stopping ┘
//! ```
//!
//! `start()` while not Stopped and `stop()` while not Running are
//! rejected synchronously with no side effects.
//!
//! ## Concurrency
//!
//! Exactly one capture-to-score cycle is in flight at any time: the
//! sampling thread is the only writer of the history and the sample
//! counters, and its tick wait doubles as the shutdown receive, so
//! `stop()` joins the thread before returning and no in-flight result
//! can be observed afterwards. Each orchestrator owns its source, store,
//! history, and status; stations never share mutable state.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sidwatch_core::config::{ConfigError, SidwatchConfig};
use sidwatch_core::scoring::score;
use sidwatch_core::timing::now_ms;
use sidwatch_core::types::{CorrelationResult, ScoredSignal, SolarActivitySnapshot, VlfAggregate};
use sidwatch_core::{BandExtractor, CorrelationEngine, SignalHistory, SpectralAnalyzer};

use crate::audio::{AudioSource, CaptureError};
use crate::store::{PersistentStore, StoreError};

/// Result type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Errors from monitor lifecycle and query operations.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Monitor already running")]
    AlreadyRunning,

    #[error("Monitor not running")]
    NotRunning,

    #[error("Configuration is locked while the monitor is running")]
    ConfigLocked,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lifecycle state of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorState {
    /// No sampling thread, source closed.
    Stopped,
    /// `start()` in progress: opening the source, spawning workers.
    Starting,
    /// Sampling at the configured cadence.
    Running,
    /// `stop()` in progress: draining and joining workers.
    Stopping,
}

/// Run state of a monitor, readable while sampling continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorStatus {
    /// True between a successful `start()` and `stop()`.
    pub running: bool,
    /// Station this monitor samples for.
    pub station_id: u32,
    /// When sampling started, Unix epoch milliseconds.
    pub start_time_ms: Option<u64>,
    /// Frames scored since `start()`.
    pub samples_processed: u64,
    /// Most recent scored signal.
    pub last_sample: Option<ScoredSignal>,
    /// Capture and persistence failures since `start()`.
    pub error_count: u64,
}

impl MonitorStatus {
    fn stopped(station_id: u32) -> Self {
        Self {
            running: false,
            station_id,
            start_time_ms: None,
            samples_processed: 0,
            last_sample: None,
            error_count: 0,
        }
    }
}

/// Pipeline stages owned by the sampling thread while running.
struct Pipeline {
    source: Box<dyn AudioSource>,
    analyzer: SpectralAnalyzer,
    extractor: BandExtractor,
}

/// Handles for the running worker threads.
struct Workers {
    shutdown_tx: Sender<()>,
    sampler: JoinHandle<Pipeline>,
    persist_tx: Sender<ScoredSignal>,
    writer: JoinHandle<()>,
}

/// Orchestrates capture, scoring, history, and persistence for one station.
pub struct MonitorOrchestrator {
    station_id: u32,
    config: SidwatchConfig,
    state: MonitorState,
    /// Present while stopped; moved into the sampling thread while running.
    pipeline: Option<Pipeline>,
    store: Arc<dyn PersistentStore>,
    history: Arc<Mutex<SignalHistory>>,
    status: Arc<Mutex<MonitorStatus>>,
    engine: CorrelationEngine,
    workers: Option<Workers>,
}

impl MonitorOrchestrator {
    /// Create a monitor for one station.
    ///
    /// Validates the configuration and builds the spectral analyzer up
    /// front, so an invalid transform size or sample rate fails here and
    /// never during sampling.
    pub fn new(
        station_id: u32,
        config: SidwatchConfig,
        source: Box<dyn AudioSource>,
        store: Arc<dyn PersistentStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let analyzer = SpectralAnalyzer::new(config.audio.sample_rate, config.spectral.fft_size)?;
        let extractor = BandExtractor::new(config.band);
        let history = SignalHistory::new(config.sampling.history_capacity);

        Ok(Self {
            station_id,
            config,
            state: MonitorState::Stopped,
            pipeline: Some(Pipeline {
                source,
                analyzer,
                extractor,
            }),
            store,
            history: Arc::new(Mutex::new(history)),
            status: Arc::new(Mutex::new(MonitorStatus::stopped(station_id))),
            engine: CorrelationEngine::new(),
            workers: None,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Snapshot of the run state.
    pub fn status(&self) -> MonitorStatus {
        self.status.lock().unwrap().clone()
    }

    /// Begin sampling.
    ///
    /// Fails with [`MonitorError::AlreadyRunning`] unless currently
    /// Stopped. If the audio source cannot start, the monitor remains
    /// Stopped and the capture error propagates.
    pub fn start(&mut self) -> MonitorResult<()> {
        if self.state != MonitorState::Stopped {
            return Err(MonitorError::AlreadyRunning);
        }
        self.state = MonitorState::Starting;

        let mut pipeline = self
            .pipeline
            .take()
            .expect("pipeline present whenever state is Stopped");
        if let Err(e) = pipeline.source.start_capture() {
            self.pipeline = Some(pipeline);
            self.state = MonitorState::Stopped;
            return Err(e.into());
        }

        {
            let mut status = self.status.lock().unwrap();
            *status = MonitorStatus::stopped(self.station_id);
            status.running = true;
            status.start_time_ms = Some(now_ms());
        }

        // Persistence writer: drains scored signals so store latency and
        // failures never delay the next tick.
        let (persist_tx, persist_rx) = mpsc::channel::<ScoredSignal>();
        let writer_store = Arc::clone(&self.store);
        let writer_status = Arc::clone(&self.status);
        let station_id = self.station_id;
        let writer = thread::spawn(move || {
            for signal in persist_rx {
                if let Err(e) = writer_store.append(station_id, &signal) {
                    warn!(station = station_id, error = %e, "failed to persist signal");
                    writer_status.lock().unwrap().error_count += 1;
                }
            }
        });

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let interval = Duration::from_secs(self.config.sampling.interval_secs);
        let capture_timeout = Duration::from_millis(self.config.sampling.capture_timeout_ms);
        let history = Arc::clone(&self.history);
        let status = Arc::clone(&self.status);
        let sampler_tx = persist_tx.clone();

        let sampler = thread::spawn(move || {
            loop {
                match Self::sample_once(&mut pipeline, capture_timeout) {
                    Ok(signal) => {
                        history.lock().unwrap().append(signal.clone());
                        {
                            let mut status = status.lock().unwrap();
                            status.samples_processed += 1;
                            status.last_sample = Some(signal.clone());
                        }
                        debug!(
                            station = station_id,
                            amplitude_db = signal.amplitude_db,
                            snr_db = signal.snr_db,
                            "sample scored"
                        );
                        // Writer gone means we are shutting down anyway.
                        let _ = sampler_tx.send(signal);
                    }
                    Err(e) => {
                        warn!(station = station_id, error = %e, "sample failed");
                        status.lock().unwrap().error_count += 1;
                    }
                }

                // The tick wait doubles as the shutdown receive: any
                // message or a disconnected channel ends the loop.
                match shutdown_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    _ => break,
                }
            }
            pipeline
        });

        self.workers = Some(Workers {
            shutdown_tx,
            sampler,
            persist_tx,
            writer,
        });
        self.state = MonitorState::Running;
        info!(station = self.station_id, "monitoring started");
        Ok(())
    }

    /// Stop sampling.
    ///
    /// Fails with [`MonitorError::NotRunning`] unless currently Running.
    /// Joins both worker threads, so on return no further samples or
    /// writes can occur.
    pub fn stop(&mut self) -> MonitorResult<()> {
        if self.state != MonitorState::Running {
            return Err(MonitorError::NotRunning);
        }
        self.state = MonitorState::Stopping;

        let workers = self
            .workers
            .take()
            .expect("workers present whenever state is Running");
        // The sampler may have exited already if the channel died; either
        // way the join below is what matters.
        let _ = workers.shutdown_tx.send(());
        let mut pipeline = match workers.sampler.join() {
            Ok(pipeline) => pipeline,
            Err(panic) => std::panic::resume_unwind(panic),
        };

        // Drop the last sender so the writer drains and exits.
        drop(workers.persist_tx);
        if workers.writer.join().is_err() {
            warn!(station = self.station_id, "persistence writer panicked");
        }

        if let Err(e) = pipeline.source.stop_capture() {
            warn!(station = self.station_id, error = %e, "audio source failed to stop");
        }
        self.pipeline = Some(pipeline);

        {
            let mut status = self.status.lock().unwrap();
            status.running = false;
            status.start_time_ms = None;
        }
        self.state = MonitorState::Stopped;
        info!(station = self.station_id, "monitoring stopped");
        Ok(())
    }

    /// One capture-to-score cycle.
    fn sample_once(
        pipeline: &mut Pipeline,
        capture_timeout: Duration,
    ) -> Result<ScoredSignal, CaptureError> {
        let frame = pipeline.source.next_frame(capture_timeout)?;
        let bins = pipeline.analyzer.analyze(&frame);
        let peak = pipeline.extractor.extract(&bins);
        Ok(score(&peak, frame.captured_at_ms))
    }

    /// The last `n` scored signals, oldest first.
    pub fn latest(&self, n: usize) -> Vec<ScoredSignal> {
        self.history.lock().unwrap().recent(n)
    }

    /// Persisted signals for a station within `[start_ms, end_ms]`.
    pub fn historical(
        &self,
        station_id: u32,
        start_ms: u64,
        end_ms: u64,
    ) -> MonitorResult<Vec<ScoredSignal>> {
        Ok(self.store.query_range(station_id, start_ms, end_ms)?)
    }

    /// Signals deviating more than `k` standard deviations from the mean.
    pub fn detect_anomalies(&self, k: f64) -> Vec<ScoredSignal> {
        self.history.lock().unwrap().anomalies(k)
    }

    /// Aggregate disturbance metrics over the retained history.
    pub fn aggregate(&self) -> VlfAggregate {
        self.history.lock().unwrap().aggregate()
    }

    /// Correlate a solar snapshot against this station's current history.
    pub fn correlate(&self, solar: SolarActivitySnapshot) -> CorrelationResult {
        self.engine.correlate(solar, self.aggregate())
    }

    /// Correlate a solar snapshot against an explicit VLF aggregate.
    pub fn correlate_with(
        &self,
        solar: SolarActivitySnapshot,
        vlf: VlfAggregate,
    ) -> CorrelationResult {
        self.engine.correlate(solar, vlf)
    }

    /// The active configuration.
    pub fn config(&self) -> &SidwatchConfig {
        &self.config
    }

    /// Replace the configuration and rebuild the pipeline stages.
    ///
    /// Rejected while running; stop first.
    pub fn update_config(&mut self, config: SidwatchConfig) -> MonitorResult<()> {
        if self.state != MonitorState::Stopped {
            return Err(MonitorError::ConfigLocked);
        }
        config.validate()?;
        let analyzer = SpectralAnalyzer::new(config.audio.sample_rate, config.spectral.fft_size)?;
        let pipeline = self
            .pipeline
            .as_mut()
            .expect("pipeline present whenever state is Stopped");
        pipeline.analyzer = analyzer;
        pipeline.extractor = BandExtractor::new(config.band);
        // Capacity change applies to future growth; retained signals stay.
        self.config = config;
        Ok(())
    }
}

impl Drop for MonitorOrchestrator {
    fn drop(&mut self) {
        if self.state == MonitorState::Running {
            let _ = self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimConfig, SimulatedAudioSource};
    use crate::store::MemoryStore;

    fn fast_config() -> SidwatchConfig {
        let mut config = SidwatchConfig::default();
        config.sampling.interval_secs = 1;
        config
    }

    fn orchestrator(station_id: u32) -> MonitorOrchestrator {
        let source = Box::new(SimulatedAudioSource::new(SimConfig::default()));
        MonitorOrchestrator::new(
            station_id,
            fast_config(),
            source,
            Arc::new(MemoryStore::new()),
        )
        .unwrap()
    }

    #[test]
    fn rejects_invalid_config_at_construction() {
        let mut config = fast_config();
        config.spectral.fft_size = 1000;
        let source = Box::new(SimulatedAudioSource::new(SimConfig::default()));
        let result =
            MonitorOrchestrator::new(1, config, source, Arc::new(MemoryStore::new()));
        assert!(result.is_err());
    }

    #[test]
    fn double_start_is_rejected_without_side_effects() {
        let mut monitor = orchestrator(1);
        monitor.start().unwrap();
        assert_eq!(monitor.state(), MonitorState::Running);
        assert!(matches!(monitor.start(), Err(MonitorError::AlreadyRunning)));
        assert_eq!(monitor.state(), MonitorState::Running);
        assert!(monitor.status().running);
        monitor.stop().unwrap();
    }

    #[test]
    fn stop_while_stopped_is_rejected() {
        let mut monitor = orchestrator(1);
        assert!(matches!(monitor.stop(), Err(MonitorError::NotRunning)));
        assert_eq!(monitor.state(), MonitorState::Stopped);
    }

    #[test]
    fn capture_failure_leaves_monitor_stopped() {
        let mut source = SimulatedAudioSource::new(SimConfig::default());
        source.fail_next_start();
        let mut monitor = MonitorOrchestrator::new(
            1,
            fast_config(),
            Box::new(source),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();

        assert!(matches!(
            monitor.start(),
            Err(MonitorError::Capture(CaptureError::DeviceUnavailable(_)))
        ));
        assert_eq!(monitor.state(), MonitorState::Stopped);
        assert!(!monitor.status().running);
        // Recoverable: the next start succeeds.
        monitor.start().unwrap();
        monitor.stop().unwrap();
    }

    #[test]
    fn first_sample_is_taken_immediately_and_persisted() {
        let store = Arc::new(MemoryStore::new());
        let source = Box::new(SimulatedAudioSource::new(SimConfig::default()));
        let mut monitor =
            MonitorOrchestrator::new(3, fast_config(), source, store.clone()).unwrap();

        monitor.start().unwrap();
        // The first tick runs before any interval elapses; joining the
        // workers in stop() guarantees it is visible afterwards.
        monitor.stop().unwrap();

        let status = monitor.status();
        assert!(status.samples_processed >= 1);
        assert!(status.last_sample.is_some());
        assert_eq!(status.error_count, 0);
        assert!(store.len() >= 1);
        assert_eq!(monitor.latest(10).len() as u64, status.samples_processed.min(10));
    }

    #[test]
    fn restart_resets_counters() {
        // Default 60 s cadence: each run takes exactly its immediate
        // first sample before stop() joins the workers.
        let source = Box::new(SimulatedAudioSource::new(SimConfig::default()));
        let mut monitor = MonitorOrchestrator::new(
            1,
            SidwatchConfig::default(),
            source,
            Arc::new(MemoryStore::new()),
        )
        .unwrap();
        monitor.start().unwrap();
        monitor.stop().unwrap();
        let first_run = monitor.status().samples_processed;
        assert!(first_run >= 1);

        monitor.start().unwrap();
        let restarted = monitor.status();
        assert!(restarted.samples_processed <= first_run);
        assert!(restarted.running);
        monitor.stop().unwrap();
    }

    #[test]
    fn config_updates_rejected_while_running() {
        let mut monitor = orchestrator(1);
        monitor.start().unwrap();
        assert!(matches!(
            monitor.update_config(fast_config()),
            Err(MonitorError::ConfigLocked)
        ));
        monitor.stop().unwrap();
        monitor.update_config(fast_config()).unwrap();
    }

    #[test]
    fn correlate_uses_current_history() {
        use crate::spaceweather::{FixtureProvider, SpaceWeatherProvider};

        let monitor = orchestrator(1);
        let snap = FixtureProvider::quiet_sun().fetch_current().unwrap();
        let result = monitor.correlate(snap);
        // Empty history: zero confidence, still a valid verdict.
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.vlf.signal_count, 0);
    }
}
