//! BACpipes Server - Dashboard API
//!
//! Read-only HTTP surface over the reading store. Each request is stateless:
//! it reads "now" from the server clock, runs one reshaping operation and
//! returns JSON or CSV.
//!
//! Key Features:
//! - Live point snapshot with freshness tiers
//! - Per-point trend history over named windows
//! - Long and wide CSV export
//! - Store health statistics and a liveness probe
//!
//! @version 0.1.0
//! @author BACpipes Development Team

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::create_router;
pub use state::{connect_store, AppState};
