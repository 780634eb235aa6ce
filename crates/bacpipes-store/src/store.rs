//! BACpipes Reading Store Trait
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::error::StoreError;
use crate::query::ReadingQuery;
use crate::stats::WindowStats;
use async_trait::async_trait;
use bacpipes_common::Reading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Storage Footprint
// =============================================================================

/// Human-readable storage sizes reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFootprint {
    pub database_size: String,
    pub table_size: String,
    pub index_size: String,
}

impl StorageFootprint {
    pub fn unknown() -> Self {
        Self {
            database_size: "Unknown".to_string(),
            table_size: "Unknown".to_string(),
            index_size: "Unknown".to_string(),
        }
    }
}

// =============================================================================
// Reading Store
// =============================================================================

/// Read-side access to the append-only reading table.
///
/// Implementations must allow concurrent calls from many requests and must
/// not hold a lock across an await point.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Fetch every reading matching the query, in the requested order.
    async fn fetch(&self, query: &ReadingQuery) -> Result<Vec<Reading>, StoreError>;

    /// Store-maintained row estimate. May lag behind recent writes.
    async fn approximate_count(&self) -> Result<u64, StoreError>;

    async fn footprint(&self) -> Result<StorageFootprint, StoreError>;

    /// Roll up every reading at or after `since` without returning the rows.
    ///
    /// Readings at or after `activity_since` are counted as recent. The
    /// window has no upper bound. At most `top_points` series rollups come
    /// back, busiest first.
    async fn window_stats(
        &self,
        since: DateTime<Utc>,
        activity_since: DateTime<Utc>,
        top_points: usize,
    ) -> Result<WindowStats, StoreError>;

    /// Release backend resources on shutdown.
    async fn close(&self) {}

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}
