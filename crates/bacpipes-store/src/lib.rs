//! BACpipes Store - Series Store Adapter
//!
//! Read-only access to the append-only reading table. Every query is a
//! time interval plus an optional series key, always passed as bound
//! parameters. Failures surface as `StoreError` and are never retried here.
//!
//! Key Features:
//! - `ReadingStore` trait shared by all backends
//! - PostgreSQL/TimescaleDB backend on a `sqlx` connection pool
//! - In-memory backend for tests and file-backed demos
//! - Window rollups aggregated by the backend
//! - Query timeouts enforced at the adapter boundary
//!
//! @version 0.1.0
//! @author BACpipes Development Team

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod stats;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgReadingStore;
pub use query::{ReadingOrder, ReadingQuery};
pub use stats::{PointStats, WindowStats};
pub use store::{ReadingStore, StorageFootprint};
