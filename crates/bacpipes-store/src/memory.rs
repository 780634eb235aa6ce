//! BACpipes In-Memory Store
//!
//! A `ReadingStore` over a vector of readings kept in insertion order.
//! Used by tests and by the server when no database is configured.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::error::StoreError;
use crate::query::ReadingQuery;
use crate::stats::{aggregate, WindowStats};
use crate::store::{ReadingStore, StorageFootprint};
use async_trait::async_trait;
use bacpipes_common::utils::format_footprint;
use bacpipes_common::{BacpipesError, Reading};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::path::Path;

/// Fixed per-reading overhead used for the footprint estimate.
const READING_OVERHEAD_BYTES: usize = std::mem::size_of::<Reading>();

// =============================================================================
// Memory Store
// =============================================================================

/// Thread-safe in-memory reading table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: RwLock<Vec<Reading>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_readings(readings: Vec<Reading>) -> Self {
        Self {
            readings: RwLock::new(readings),
        }
    }

    /// Load a JSON array of readings from disk.
    pub fn load(path: &Path) -> bacpipes_common::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let readings: Vec<Reading> = serde_json::from_str(&content).map_err(|e| {
            BacpipesError::Configuration(format!("{}: {}", path.display(), e))
        })?;
        tracing::info!("Loaded {} readings from {}", readings.len(), path.display());
        Ok(Self::with_readings(readings))
    }

    /// Append a reading.
    pub fn insert(&self, reading: Reading) {
        self.readings.write().push(reading);
    }

    pub fn len(&self) -> usize {
        self.readings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.read().is_empty()
    }

    fn estimated_bytes(&self) -> u64 {
        self.readings
            .read()
            .iter()
            .map(|r| {
                READING_OVERHEAD_BYTES
                    + r.series_key.len()
                    + r.display_name.as_ref().map_or(0, String::len)
                    + r.unit.as_ref().map_or(0, String::len)
                    + r.quality.as_str().len()
            })
            .sum::<usize>() as u64
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn fetch(&self, query: &ReadingQuery) -> Result<Vec<Reading>, StoreError> {
        let mut rows: Vec<Reading> = self
            .readings
            .read()
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();

        // Stable sort keeps insertion order inside tied groups.
        rows.sort_by(|a, b| query.order.compare(a, b));
        Ok(rows)
    }

    async fn approximate_count(&self) -> Result<u64, StoreError> {
        Ok(self.len() as u64)
    }

    async fn footprint(&self) -> Result<StorageFootprint, StoreError> {
        let bytes = self.estimated_bytes();
        Ok(StorageFootprint {
            database_size: format_footprint(bytes),
            table_size: format_footprint(bytes),
            index_size: format_footprint(0),
        })
    }

    async fn window_stats(
        &self,
        since: DateTime<Utc>,
        activity_since: DateTime<Utc>,
        top_points: usize,
    ) -> Result<WindowStats, StoreError> {
        let readings = self.readings.read();
        Ok(aggregate(
            readings.iter().filter(|r| r.timestamp >= since),
            activity_since,
            top_points,
        ))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================
