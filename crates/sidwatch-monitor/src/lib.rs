//! # SID Watch Monitor
//!
//! Acquisition and orchestration for VLF SID monitoring stations. Builds
//! on [`sidwatch_core`] (spectral transform, band extraction, scoring,
//! history, correlation) and adds everything around it:
//!
//! - [`audio`]: the pull-based audio source contract
//! - [`sim`]: a deterministic tone-plus-noise source for development
//! - [`store`]: the persistence contract plus memory and JSONL backends
//! - [`spaceweather`]: the solar-activity provider contract
//! - [`monitor`]: the per-station orchestrator state machine
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sidwatch_core::config::SidwatchConfig;
//! use sidwatch_monitor::monitor::MonitorOrchestrator;
//! use sidwatch_monitor::sim::{SimConfig, SimulatedAudioSource};
//! use sidwatch_monitor::store::MemoryStore;
//!
//! let source = Box::new(SimulatedAudioSource::new(SimConfig::default()));
//! let store = Arc::new(MemoryStore::new());
//! let mut monitor =
//!     MonitorOrchestrator::new(1, SidwatchConfig::default(), source, store).unwrap();
//! monitor.start().unwrap();
//! // ... sampling runs at the configured cadence ...
//! monitor.stop().unwrap();
//! ```

pub mod audio;
pub mod monitor;
pub mod sim;
pub mod spaceweather;
pub mod store;

pub use audio::{AudioSource, CaptureError};
pub use monitor::{MonitorError, MonitorOrchestrator, MonitorState, MonitorStatus};
pub use sim::{SimConfig, SimulatedAudioSource};
pub use spaceweather::{FixtureProvider, SpaceWeatherError, SpaceWeatherProvider};
pub use store::{JsonlStore, MemoryStore, PersistentStore, StoreError};
