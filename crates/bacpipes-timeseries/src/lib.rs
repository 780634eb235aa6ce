//! BACpipes Time Series - Query & Reshaping Layer
//!
//! Turns raw reading rows from the series store into the payloads the
//! dashboard consumes. Every operation is a stateless function of the store
//! contents and an explicit "now".
//!
//! Key Features:
//! - Freshness classification of reading age
//! - Latest-value snapshot per monitored point
//! - Full-resolution trend series over named windows
//! - Long and wide (pivoted) CSV export
//! - Store health and per-point rollups
//!
//! @version 0.1.0
//! @author BACpipes Development Team

pub mod csv;
pub mod export;
pub mod freshness;
pub mod health;
pub mod snapshot;
pub mod trend;
pub mod window;

pub use export::{ExportFormat, ExportRequest, ExportTable, LongRow, WideRow, WideTable};
pub use freshness::{classify, FreshnessStatus};
pub use health::{HealthSnapshot, PointStats};
pub use snapshot::{SeriesSnapshot, SnapshotRequest};
pub use trend::{TrendPoint, TrendSeries};
pub use window::TrendRange;
