//! BACpipes Time Windows
//!
//! Fixed lookback windows and the named trend ranges a caller may pick.
//! Callers never supply free-text intervals; unknown range names resolve to
//! the one-hour window.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookback for the live snapshot.
pub fn snapshot_lookback() -> Duration {
    Duration::hours(1)
}

/// Window for per-point health rollups.
pub fn health_window() -> Duration {
    Duration::days(1)
}

/// Trailing window for throughput and the data-active signal.
pub fn activity_window() -> Duration {
    Duration::hours(1)
}

// =============================================================================
// Trend Range
// =============================================================================

/// Named relative window for trend queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrendRange {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl TrendRange {
    pub const ALL: [TrendRange; 5] = [
        Self::OneHour,
        Self::SixHours,
        Self::OneDay,
        Self::SevenDays,
        Self::ThirtyDays,
    ];

    /// Resolve a request parameter. Missing or unrecognized names fall back
    /// to one hour.
    pub fn from_param(param: Option<&str>) -> Self {
        param
            .map(str::trim)
            .and_then(|name| Self::ALL.into_iter().find(|r| r.as_str() == name))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::OneDay => "24h",
            Self::SevenDays => "7d",
            Self::ThirtyDays => "30d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Self::OneHour => Duration::hours(1),
            Self::SixHours => Duration::hours(6),
            Self::OneDay => Duration::hours(24),
            Self::SevenDays => Duration::days(7),
            Self::ThirtyDays => Duration::days(30),
        }
    }
}

impl fmt::Display for TrendRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ranges() {
        assert_eq!(TrendRange::from_param(Some("1h")), TrendRange::OneHour);
        assert_eq!(TrendRange::from_param(Some("6h")), TrendRange::SixHours);
        assert_eq!(TrendRange::from_param(Some("24h")), TrendRange::OneDay);
        assert_eq!(TrendRange::from_param(Some("7d")), TrendRange::SevenDays);
        assert_eq!(TrendRange::from_param(Some("30d")), TrendRange::ThirtyDays);
    }

    #[test]
    fn test_unknown_range_falls_back() {
        assert_eq!(TrendRange::from_param(Some("99x")), TrendRange::OneHour);
        assert_eq!(TrendRange::from_param(Some("")), TrendRange::OneHour);
        assert_eq!(TrendRange::from_param(Some("1 hour")), TrendRange::OneHour);
        assert_eq!(TrendRange::from_param(None), TrendRange::OneHour);
    }

    #[test]
    fn test_durations() {
        assert_eq!(TrendRange::SixHours.duration(), Duration::hours(6));
        assert_eq!(TrendRange::ThirtyDays.duration(), Duration::days(30));
        assert_eq!(snapshot_lookback(), Duration::hours(1));
        assert_eq!(health_window(), Duration::hours(24));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TrendRange::SevenDays).unwrap();
        assert_eq!(json, "\"7d\"");
        assert_eq!(TrendRange::OneDay.to_string(), "24h");
    }
}
