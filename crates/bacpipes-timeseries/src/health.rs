//! BACpipes Health Aggregator
//!
//! Store-wide statistics for the operations dashboard: an approximate total
//! row count, storage footprint, and per-point rollups over the last day.
//! An empty store reports zeros with every timestamp set to "now".
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::freshness::{activity_cutoff, age_seconds, classify, is_data_active, FreshnessStatus};
use crate::window::health_window;
use bacpipes_common::Result;
use bacpipes_store::{ReadingStore, StorageFootprint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use bacpipes_store::{PointStats, WindowStats};

/// Number of per-point rollups reported.
pub const TOP_POINTS: usize = 20;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub total_records: u64,
    pub unique_points: u64,
    pub oldest_timestamp: DateTime<Utc>,
    pub newest_timestamp: DateTime<Utc>,
    pub database_size: String,
    pub table_size: String,
    pub index_size: String,
    /// Records per minute over the trailing hour.
    pub data_rate: f64,
    pub data_active: bool,
    /// Freshness of the newest reading; `None` when the window is empty.
    pub newest_freshness: Option<FreshnessStatus>,
    pub point_stats: Vec<PointStats>,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Assembly
// =============================================================================

/// Assemble the payload from its parts.
pub fn build_health(
    total_records: u64,
    footprint: StorageFootprint,
    stats: WindowStats,
    now: DateTime<Utc>,
) -> HealthSnapshot {
    HealthSnapshot {
        total_records,
        unique_points: stats.unique_points,
        oldest_timestamp: stats.oldest.unwrap_or(now),
        newest_timestamp: stats.newest.unwrap_or(now),
        database_size: footprint.database_size,
        table_size: footprint.table_size,
        index_size: footprint.index_size,
        data_rate: stats.recent_count as f64 / 60.0,
        data_active: is_data_active(stats.newest, now),
        newest_freshness: stats.newest.map(|ts| classify(age_seconds(ts, now))),
        point_stats: stats.point_stats,
        timestamp: now,
    }
}

/// Gather health statistics from the store.
///
/// The day window is open at the top so readings stamped ahead of `now`
/// still count. The footprint is advisory: when the store cannot report it
/// the sizes read "Unknown" instead of failing the request.
pub async fn health(store: &dyn ReadingStore, now: DateTime<Utc>) -> Result<HealthSnapshot> {
    let total_records = store.approximate_count().await?;

    let footprint = match store.footprint().await {
        Ok(footprint) => footprint,
        Err(e) => {
            tracing::warn!(backend = store.backend(), error = %e, "storage footprint unavailable");
            StorageFootprint::unknown()
        }
    };

    let stats = store
        .window_stats(now - health_window(), activity_cutoff(now), TOP_POINTS)
        .await?;

    Ok(build_health(total_records, footprint, stats, now))
}

// =============================================================================
// Tests
// =============================================================================
