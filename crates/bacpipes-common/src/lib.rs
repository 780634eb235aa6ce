//! BACpipes Common - Shared Types and Utilities
//!
//! Foundational types shared by the store adapter, the time series
//! reshaping layer and the HTTP server. Provides the reading model, the
//! unified error type and small utilities.
//!
//! Key Features:
//! - Immutable `Reading` model with display-name fallback
//! - Unified error type split into caller (validation) and store failures
//! - Clock abstraction so every operation works from an explicit "now"
//! - Human-readable size formatting
//!
//! @version 0.1.0
//! @author BACpipes Development Team

pub mod clock;
pub mod error;
pub mod types;
pub mod utils;

pub use clock::{Clock, MockClock, SystemClock};
pub use error::{BacpipesError, Result};
pub use types::{display_or_key, Quality, Reading};
