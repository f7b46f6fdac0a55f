//! Persistence abstraction for scored signals.
//!
//! The orchestrator writes every scored signal through a
//! [`PersistentStore`]. The trait is intentionally narrow: append one
//! record, or query a station's time range. A relational backend sits
//! behind the same contract in a full deployment; here a thread-safe
//! in-memory store and an append-only JSON-lines file store cover
//! development and single-station use.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use sidwatch_core::types::ScoredSignal;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store poisoned by a panicked writer")]
    Poisoned,
}

/// Narrow persistence contract for scored signals.
pub trait PersistentStore: Send + Sync {
    /// Append one scored signal for a station.
    fn append(&self, station_id: u32, signal: &ScoredSignal) -> StoreResult<()>;

    /// Signals for a station within `[start_ms, end_ms]`, ascending by time.
    fn query_range(
        &self,
        station_id: u32,
        start_ms: u64,
        end_ms: u64,
    ) -> StoreResult<Vec<ScoredSignal>>;
}

/// Thread-safe in-memory store, keyed by station.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<u32, Vec<ScoredSignal>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records across all stations.
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .map(|map| map.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// True if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistentStore for MemoryStore {
    fn append(&self, station_id: u32, signal: &ScoredSignal) -> StoreResult<()> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        records.entry(station_id).or_default().push(signal.clone());
        Ok(())
    }

    fn query_range(
        &self,
        station_id: u32,
        start_ms: u64,
        end_ms: u64,
    ) -> StoreResult<Vec<ScoredSignal>> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        let mut out: Vec<ScoredSignal> = records
            .get(&station_id)
            .map(|signals| {
                signals
                    .iter()
                    .filter(|s| s.timestamp_ms >= start_ms && s.timestamp_ms <= end_ms)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        out.sort_by_key(|s| s.timestamp_ms);
        Ok(out)
    }
}

/// One line of the JSONL file.
#[derive(Debug, Serialize, Deserialize)]
struct JsonlRecord {
    station_id: u32,
    #[serde(flatten)]
    signal: ScoredSignal,
}

/// Append-only JSON-lines file store.
///
/// Each record is one JSON object per line, so the file tails cleanly
/// and partial writes corrupt at most the final line.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlStore {
    /// Open (or create) a JSONL store at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistentStore for JsonlStore {
    fn append(&self, station_id: u32, signal: &ScoredSignal) -> StoreResult<()> {
        let record = JsonlRecord {
            station_id,
            signal: signal.clone(),
        };
        let line = serde_json::to_string(&record)?;
        let mut file = self.file.lock().map_err(|_| StoreError::Poisoned)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn query_range(
        &self,
        station_id: u32,
        start_ms: u64,
        end_ms: u64,
    ) -> StoreResult<Vec<ScoredSignal>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut out = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: JsonlRecord = serde_json::from_str(&line)?;
            if record.station_id == station_id
                && record.signal.timestamp_ms >= start_ms
                && record.signal.timestamp_ms <= end_ms
            {
                out.push(record.signal);
            }
        }
        out.sort_by_key(|s| s.timestamp_ms);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(timestamp_ms: u64) -> ScoredSignal {
        ScoredSignal {
            timestamp_ms,
            frequency_hz: 24_000.0,
            amplitude_db: -42.0,
            phase_deg: 10.0,
            snr_db: 18.0,
            quality: 70.0,
            raw_amplitude: 0.008,
            noise_floor_db: -60.0,
        }
    }

    #[test]
    fn memory_store_filters_by_station_and_range() {
        let store = MemoryStore::new();
        store.append(1, &signal(100)).unwrap();
        store.append(1, &signal(200)).unwrap();
        store.append(1, &signal(300)).unwrap();
        store.append(2, &signal(200)).unwrap();

        let hits = store.query_range(1, 150, 250).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].timestamp_ms, 200);
        assert!(store.query_range(3, 0, u64::MAX).unwrap().is_empty());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn jsonl_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path().join("signals.jsonl")).unwrap();
        store.append(7, &signal(1_000)).unwrap();
        store.append(7, &signal(2_000)).unwrap();
        store.append(8, &signal(1_500)).unwrap();

        let hits = store.query_range(7, 0, u64::MAX).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], signal(1_000));
        assert_eq!(hits[1], signal(2_000));

        let bounded = store.query_range(7, 1_500, u64::MAX).unwrap();
        assert_eq!(bounded.len(), 1);
        assert_eq!(bounded[0].timestamp_ms, 2_000);
    }

    #[test]
    fn jsonl_store_reopens_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signals.jsonl");
        {
            let store = JsonlStore::open(&path).unwrap();
            store.append(1, &signal(10)).unwrap();
        }
        let store = JsonlStore::open(&path).unwrap();
        store.append(1, &signal(20)).unwrap();
        let hits = store.query_range(1, 0, u64::MAX).unwrap();
        assert_eq!(hits.len(), 2);
    }
}
