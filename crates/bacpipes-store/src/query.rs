//! BACpipes Reading Query
//!
//! The only filter shape the store understands: an inclusive time interval
//! (optionally open at the top), an optional exact series key and a fixed
//! ordering.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use bacpipes_common::Reading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// =============================================================================
// Reading Order
// =============================================================================

/// Result ordering supported by every store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadingOrder {
    /// Ascending timestamp; ties keep store order.
    #[default]
    Timestamp,
    /// Ascending timestamp, then ascending series key.
    TimestampThenKey,
}

impl ReadingOrder {
    /// Compare two readings under this ordering.
    pub fn compare(&self, a: &Reading, b: &Reading) -> Ordering {
        match self {
            Self::Timestamp => a.timestamp.cmp(&b.timestamp),
            Self::TimestampThenKey => a
                .timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.series_key.cmp(&b.series_key)),
        }
    }
}

// =============================================================================
// Reading Query
// =============================================================================

/// A time-range query against the reading table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingQuery {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound. `None` reaches past "now", so readings stamped
    /// ahead of the server clock still match.
    pub end: Option<DateTime<Utc>>,
    pub series_key: Option<String>,
    pub order: ReadingOrder,
}

impl ReadingQuery {
    /// Query all readings in `[start, end]`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
            series_key: None,
            order: ReadingOrder::Timestamp,
        }
    }

    /// Query everything at or after `start`.
    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: None,
            series_key: None,
            order: ReadingOrder::Timestamp,
        }
    }

    /// Restrict to a single series.
    pub fn for_series(mut self, series_key: impl Into<String>) -> Self {
        self.series_key = Some(series_key.into());
        self
    }

    pub fn ordered_by(mut self, order: ReadingOrder) -> Self {
        self.order = order;
        self
    }

    /// Check whether a reading satisfies the filter.
    pub fn matches(&self, reading: &Reading) -> bool {
        reading.timestamp >= self.start
            && self.end.map_or(true, |end| reading.timestamp <= end)
            && self
                .series_key
                .as_deref()
                .map_or(true, |key| reading.series_key == key)
    }
}

// =============================================================================
// Tests
// =============================================================================
