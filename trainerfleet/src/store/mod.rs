//! Scan result persistence.
//!
//! Workers report every successfully scanned coordinate to a [`ScanStore`].
//! The expected semantics are an idempotent upsert: the first report inserts
//! the location, later reports refresh its last-scanned timestamp. Store
//! failures are logged by the worker and never stop a scan loop.

use std::future::Future;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;

/// Errors raised by a scan store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing storage is unavailable.
    #[error("scan store unavailable: {0}")]
    Unavailable(String),

    /// The write was rejected.
    #[error("scan store write failed: {0}")]
    WriteFailed(String),
}

/// Records which locations have been scanned.
pub trait ScanStore: Send + Sync + 'static {
    /// Inserts the location or refreshes its last-scanned timestamp.
    fn record_scanned_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Last scan of a location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub last_modified: DateTime<Utc>,
}

/// In-memory scan store keyed by exact coordinate.
#[derive(Debug, Default)]
pub struct MemoryScanStore {
    entries: DashMap<(u64, u64), ScannedLocation>,
}

impl MemoryScanStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct locations recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a recorded location.
    pub fn get(&self, latitude: f64, longitude: f64) -> Option<ScannedLocation> {
        self.entries
            .get(&key(latitude, longitude))
            .map(|entry| *entry.value())
    }

    /// All recorded locations in no particular order.
    pub fn snapshot(&self) -> Vec<ScannedLocation> {
        self.entries.iter().map(|entry| *entry.value()).collect()
    }

    fn upsert(&self, latitude: f64, longitude: f64) {
        let now = Utc::now();
        self.entries
            .entry(key(latitude, longitude))
            .and_modify(|existing| existing.last_modified = now)
            .or_insert(ScannedLocation {
                latitude,
                longitude,
                last_modified: now,
            });
    }
}

fn key(latitude: f64, longitude: f64) -> (u64, u64) {
    (latitude.to_bits(), longitude.to_bits())
}

impl ScanStore for MemoryScanStore {
    async fn record_scanned_location(&self, latitude: f64, longitude: f64) -> Result<(), StoreError> {
        self.upsert(latitude, longitude);
        Ok(())
    }
}
