//! BACpipes Reading Types
//!
//! The atomic fact this service reads: one sensor value at one instant for
//! one monitored point.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Quality
// =============================================================================

/// Reading quality as reported by the acquisition pipeline.
///
/// Only `good` has a meaning here; every other vendor code is carried
/// through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Quality {
    #[default]
    Good,
    Other(String),
}

impl Quality {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Good => "good",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for Quality {
    fn from(code: String) -> Self {
        if code == "good" {
            Self::Good
        } else {
            Self::Other(code)
        }
    }
}

impl From<&str> for Quality {
    fn from(code: &str) -> Self {
        Self::from(code.to_string())
    }
}

impl From<Quality> for String {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::Good => "good".to_string(),
            Quality::Other(code) => code,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Reading
// =============================================================================

/// A single stored sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    /// Stable machine identifier of the point (e.g. a haystack tag path).
    pub series_key: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub quality: Quality,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, series_key: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp,
            series_key: series_key.into(),
            display_name: None,
            value,
            unit: None,
            quality: Quality::Good,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_quality(mut self, quality: impl Into<Quality>) -> Self {
        self.quality = quality.into();
        self
    }

    /// Display name if present and non-blank, otherwise the series key.
    pub fn effective_name(&self) -> &str {
        display_or_key(self.display_name.as_deref(), &self.series_key)
    }
}

/// Name shown for a series: its display name unless missing or blank.
pub fn display_or_key<'a>(display_name: Option<&'a str>, series_key: &'a str) -> &'a str {
    match display_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => series_key,
    }
}

// =============================================================================
// Tests
// =============================================================================
