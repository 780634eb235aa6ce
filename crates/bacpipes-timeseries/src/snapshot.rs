//! BACpipes Snapshot Builder
//!
//! Latest reading per monitored point within the live lookback window. The
//! window is open at the top: a reading stamped ahead of the server clock is
//! still the latest one, reported with age zero.
//!
//! Duplicate timestamps for the same series are resolved in favour of the
//! first reading seen at that instant. Store return order for tied rows is
//! not defined, so callers must not rely on which one wins.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::freshness::{age_seconds, classify, FreshnessStatus};
use crate::window::snapshot_lookback;
use bacpipes_common::{BacpipesError, Reading, Result};
use bacpipes_store::{ReadingQuery, ReadingStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_SNAPSHOT_LIMIT: usize = 100;

// =============================================================================
// Request
// =============================================================================

/// Caller-supplied snapshot filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub search: Option<String>,
    pub limit: usize,
}

impl Default for SnapshotRequest {
    fn default() -> Self {
        Self {
            search: None,
            limit: DEFAULT_SNAPSHOT_LIMIT,
        }
    }
}

impl SnapshotRequest {
    /// Build a request from raw query parameters.
    ///
    /// A blank search means no filter. The limit must be a positive integer.
    pub fn from_params(search: Option<&str>, limit: Option<&str>) -> Result<Self> {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let limit = match limit.map(str::trim) {
            None | Some("") => DEFAULT_SNAPSHOT_LIMIT,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(BacpipesError::validation(
                        "limit",
                        "limit must be a positive integer",
                    ))
                }
            },
        };

        Ok(Self { search, limit })
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn matches(&self, name: &str) -> bool {
        match &self.search {
            Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

// =============================================================================
// Series Snapshot
// =============================================================================

/// Latest known state of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSnapshot {
    pub point_name: String,
    pub haystack_name: String,
    pub value: f64,
    pub units: Option<String>,
    pub quality: String,
    pub timestamp: DateTime<Utc>,
    pub age_seconds: f64,
    pub freshness_status: FreshnessStatus,
}

impl SeriesSnapshot {
    pub fn from_reading(reading: &Reading, now: DateTime<Utc>) -> Self {
        let age = age_seconds(reading.timestamp, now);
        Self {
            point_name: reading.effective_name().to_string(),
            haystack_name: reading.series_key.clone(),
            value: reading.value,
            units: reading.unit.clone(),
            quality: reading.quality.to_string(),
            timestamp: reading.timestamp,
            age_seconds: age,
            freshness_status: classify(age),
        }
    }
}

// =============================================================================
// Building
// =============================================================================

/// Fold readings to the newest one per series key, ordered by key.
pub fn latest_per_series(readings: &[Reading]) -> Vec<&Reading> {
    let mut best: HashMap<&str, &Reading> = HashMap::new();
    for reading in readings {
        best.entry(reading.series_key.as_str())
            .and_modify(|current| {
                if reading.timestamp > current.timestamp {
                    *current = reading;
                }
            })
            .or_insert(reading);
    }

    let mut latest: Vec<&Reading> = best.into_values().collect();
    latest.sort_by(|a, b| a.series_key.cmp(&b.series_key));
    latest
}

/// Build the snapshot from already-fetched readings.
pub fn build_snapshot(
    readings: &[Reading],
    request: &SnapshotRequest,
    now: DateTime<Utc>,
) -> Vec<SeriesSnapshot> {
    latest_per_series(readings)
        .into_iter()
        .filter(|r| request.matches(r.effective_name()))
        .take(request.limit)
        .map(|r| SeriesSnapshot::from_reading(r, now))
        .collect()
}

/// Fetch everything since the lookback start and build the snapshot.
pub async fn snapshot(
    store: &dyn ReadingStore,
    request: &SnapshotRequest,
    now: DateTime<Utc>,
) -> Result<Vec<SeriesSnapshot>> {
    let query = ReadingQuery::since(now - snapshot_lookback());
    let readings = store.fetch(&query).await?;
    let points = build_snapshot(&readings, request, now);

    tracing::debug!(
        rows = readings.len(),
        points = points.len(),
        "built snapshot"
    );
    Ok(points)
}

// =============================================================================
// Tests
// =============================================================================
