//! BACpipes Trend Extractor
//!
//! Full-resolution history of one series over a named window. No
//! resampling is applied; long windows over fast series return every row.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::window::TrendRange;
use bacpipes_common::{BacpipesError, Reading, Result};
use bacpipes_store::{ReadingOrder, ReadingQuery, ReadingStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sample in a trend series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl From<&Reading> for TrendPoint {
    fn from(reading: &Reading) -> Self {
        Self {
            timestamp: reading.timestamp,
            value: reading.value,
        }
    }
}

/// Ascending samples of one series over a resolved window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub series_key: String,
    pub range: TrendRange,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Validate the series key parameter. Blank counts as missing.
pub fn require_series_key(point: Option<&str>) -> Result<&str> {
    match point.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(BacpipesError::validation(
            "point",
            "Point parameter is required",
        )),
    }
}

/// Fetch `[now - range, now]` for one series in ascending time order.
pub async fn trend(
    store: &dyn ReadingStore,
    series_key: &str,
    range: TrendRange,
    now: DateTime<Utc>,
) -> Result<TrendSeries> {
    let series_key = require_series_key(Some(series_key))?;

    let query = ReadingQuery::between(now - range.duration(), now)
        .for_series(series_key)
        .ordered_by(ReadingOrder::Timestamp);
    let readings = store.fetch(&query).await?;

    tracing::debug!(series = series_key, range = %range, rows = readings.len(), "fetched trend");

    Ok(TrendSeries {
        series_key: series_key.to_string(),
        range,
        points: readings.iter().map(TrendPoint::from).collect(),
    })
}

// =============================================================================
// Tests
// =============================================================================
