//! BACpipes Export Reshaper
//!
//! Reshapes every reading in an absolute interval into a CSV table, either
//! long (one row per reading) or wide (one row per timestamp, one column per
//! point).
//!
//! The wide pivot runs two passes over a single fetched row set: the first
//! collects the sorted column names, the second groups values by exact
//! timestamp. When one point has several readings at the same instant the
//! last one fetched fills the cell. Cells with no reading stay empty; values
//! are never carried forward.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::csv::{format_timestamp, format_value, CsvWriter};
use bacpipes_common::{BacpipesError, Reading, Result};
use bacpipes_store::{ReadingOrder, ReadingQuery, ReadingStore};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Header of the long CSV layout.
pub const LONG_HEADER: [&str; 6] = [
    "timestamp",
    "point_name",
    "haystack_name",
    "value",
    "units",
    "quality",
];

// =============================================================================
// Export Format
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Long,
    Wide,
}

impl ExportFormat {
    /// Missing means long; anything other than `long` or `wide` is rejected.
    pub fn from_param(param: Option<&str>) -> Result<Self> {
        match param.map(str::trim) {
            None | Some("") => Ok(Self::Long),
            Some(name) if name.eq_ignore_ascii_case("long") => Ok(Self::Long),
            Some(name) if name.eq_ignore_ascii_case("wide") => Ok(Self::Wide),
            Some(other) => Err(BacpipesError::validation(
                "format",
                format!("unsupported export format '{other}', expected long or wide"),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Wide => "wide",
        }
    }

    /// Download filename for this layout.
    pub fn filename(&self) -> String {
        format!("bacpipes_export_{}.csv", self.as_str())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Export Request
// =============================================================================

/// A validated export interval and layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub format: ExportFormat,
}

impl ExportRequest {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, format: ExportFormat) -> Result<Self> {
        if start > end {
            return Err(BacpipesError::validation(
                "startDate",
                "startDate must not be after endDate",
            ));
        }
        Ok(Self { start, end, format })
    }

    /// Build a request from raw query parameters. Both dates are required.
    pub fn from_params(
        start: Option<&str>,
        end: Option<&str>,
        format: Option<&str>,
    ) -> Result<Self> {
        let start = parse_instant("startDate", start)?;
        let end = parse_instant("endDate", end)?;
        let format = ExportFormat::from_param(format)?;
        Self::new(start, end, format)
    }

    fn query(&self) -> ReadingQuery {
        ReadingQuery::between(self.start, self.end)
    }
}

/// Parse an export boundary.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM[:SS[.f]]` taken as UTC, or a
/// bare `YYYY-MM-DD` meaning midnight UTC.
pub fn parse_instant(field: &str, raw: Option<&str>) -> Result<DateTime<Utc>> {
    let raw = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => {
            return Err(BacpipesError::validation(
                field,
                format!("{field} is required"),
            ))
        }
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(BacpipesError::validation(
        field,
        format!("'{raw}' is not a valid date or timestamp"),
    ))
}

// =============================================================================
// Tables
// =============================================================================

/// One reading in the long layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow {
    pub timestamp: DateTime<Utc>,
    pub point_name: String,
    pub haystack_name: String,
    pub value: f64,
    pub units: Option<String>,
    pub quality: String,
}

impl From<&Reading> for LongRow {
    fn from(reading: &Reading) -> Self {
        Self {
            timestamp: reading.timestamp,
            point_name: reading.effective_name().to_string(),
            haystack_name: reading.series_key.clone(),
            value: reading.value,
            units: reading.unit.clone(),
            quality: reading.quality.to_string(),
        }
    }
}

/// One timestamp in the wide layout. `cells` lines up with the table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideRow {
    pub timestamp: DateTime<Utc>,
    pub cells: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WideTable {
    pub columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

/// A reshaped export, ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportTable {
    Long(Vec<LongRow>),
    Wide(WideTable),
}

impl ExportTable {
    /// Layout this table was reshaped into.
    pub fn format(&self) -> ExportFormat {
        match self {
            Self::Long(_) => ExportFormat::Long,
            Self::Wide(_) => ExportFormat::Wide,
        }
    }

    /// Data rows, excluding the header.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Long(rows) => rows.len(),
            Self::Wide(table) => table.rows.len(),
        }
    }

    pub fn to_csv(&self) -> String {
        let mut writer = CsvWriter::new();
        match self {
            Self::Long(rows) => {
                writer.write_record(LONG_HEADER);
                for row in rows {
                    writer.write_record([
                        format_timestamp(row.timestamp),
                        row.point_name.clone(),
                        row.haystack_name.clone(),
                        format_value(row.value),
                        row.units.clone().unwrap_or_default(),
                        row.quality.clone(),
                    ]);
                }
            }
            Self::Wide(table) => {
                let header =
                    std::iter::once("timestamp").chain(table.columns.iter().map(String::as_str));
                writer.write_record(header);
                for row in &table.rows {
                    let cells = row
                        .cells
                        .iter()
                        .map(|cell| cell.map(format_value).unwrap_or_default());
                    writer.write_record(
                        std::iter::once(format_timestamp(row.timestamp)).chain(cells),
                    );
                }
            }
        }
        writer.finish()
    }
}

// =============================================================================
// Reshaping
// =============================================================================

/// One row per reading, in input order.
pub fn long_table(readings: &[Reading]) -> Vec<LongRow> {
    readings.iter().map(LongRow::from).collect()
}

/// Pivot readings (ascending by timestamp) into one row per timestamp.
pub fn pivot_wide(readings: &[Reading]) -> WideTable {
    let columns: Vec<String> = readings
        .iter()
        .map(|r| r.effective_name())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let column_index: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut rows: Vec<WideRow> = Vec::new();
    let mut row_index: HashMap<DateTime<Utc>, usize> = HashMap::new();

    for reading in readings {
        let Some(&col) = column_index.get(reading.effective_name()) else {
            continue;
        };
        let row = *row_index.entry(reading.timestamp).or_insert_with(|| {
            rows.push(WideRow {
                timestamp: reading.timestamp,
                cells: vec![None; columns.len()],
            });
            rows.len() - 1
        });
        rows[row].cells[col] = Some(reading.value);
    }

    WideTable { columns, rows }
}

/// Fetch the interval once and reshape it in the requested layout.
pub async fn export(store: &dyn ReadingStore, request: &ExportRequest) -> Result<ExportTable> {
    let table = match request.format {
        ExportFormat::Long => {
            let query = request.query().ordered_by(ReadingOrder::TimestampThenKey);
            let readings = store.fetch(&query).await?;
            ExportTable::Long(long_table(&readings))
        }
        ExportFormat::Wide => {
            let query = request.query().ordered_by(ReadingOrder::Timestamp);
            let readings = store.fetch(&query).await?;
            ExportTable::Wide(pivot_wide(&readings))
        }
    };

    tracing::info!(
        format = %request.format,
        start = %request.start,
        end = %request.end,
        rows = table.row_count(),
        "export reshaped"
    );
    Ok(table)
}

// =============================================================================
// Tests
// =============================================================================
