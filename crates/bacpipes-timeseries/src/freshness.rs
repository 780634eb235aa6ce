//! BACpipes Freshness Classification
//!
//! Maps the age of a reading to a fresh / recent / stale tier and answers
//! whether data is still arriving at all.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::window::activity_window;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Readings younger than this are fresh.
pub const FRESH_MAX_AGE_SECS: f64 = 60.0;
/// Readings younger than this (and not fresh) are recent.
pub const RECENT_MAX_AGE_SECS: f64 = 300.0;

// =============================================================================
// Freshness Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessStatus {
    Fresh,
    Recent,
    Stale,
}

/// Classify a reading age in seconds.
///
/// Negative ages (clock skew between the pipeline and this host) count as
/// zero.
pub fn classify(age_seconds: f64) -> FreshnessStatus {
    let age = age_seconds.max(0.0);
    if age < FRESH_MAX_AGE_SECS {
        FreshnessStatus::Fresh
    } else if age < RECENT_MAX_AGE_SECS {
        FreshnessStatus::Recent
    } else {
        FreshnessStatus::Stale
    }
}

/// Age of `timestamp` at `now` in seconds, clamped at zero.
pub fn age_seconds(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - timestamp).num_milliseconds();
    (millis as f64 / 1000.0).max(0.0)
}

/// Start of the activity window. Readings at or after it count as recent,
/// including ones stamped ahead of `now`.
pub fn activity_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - activity_window()
}

/// True iff the newest reading arrived within the trailing hour.
pub fn is_data_active(newest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    newest.map_or(false, |ts| ts >= activity_cutoff(now))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(classify(0.0), FreshnessStatus::Fresh);
        assert_eq!(classify(59.999), FreshnessStatus::Fresh);
        assert_eq!(classify(60.0), FreshnessStatus::Recent);
        assert_eq!(classify(299.9), FreshnessStatus::Recent);
        assert_eq!(classify(300.0), FreshnessStatus::Stale);
        assert_eq!(classify(86_400.0), FreshnessStatus::Stale);
    }

    #[test]
    fn test_negative_age_is_fresh() {
        assert_eq!(classify(-5.0), FreshnessStatus::Fresh);
        assert_eq!(classify(-10_000.0), FreshnessStatus::Fresh);
    }

    #[test]
    fn test_classify_matches_thresholds() {
        for tenth in 0..4000 {
            let age = tenth as f64 / 10.0;
            let expected = if age < 60.0 {
                FreshnessStatus::Fresh
            } else if age < 300.0 {
                FreshnessStatus::Recent
            } else {
                FreshnessStatus::Stale
            };
            assert_eq!(classify(age), expected, "age {age}");
        }
    }

    #[test]
    fn test_age_seconds_clamps_future_timestamps() {
        assert_eq!(age_seconds(now() - Duration::seconds(90), now()), 90.0);
        assert_eq!(age_seconds(now() - Duration::milliseconds(1500), now()), 1.5);
        assert_eq!(age_seconds(now() + Duration::seconds(30), now()), 0.0);
    }

    #[test]
    fn test_data_active() {
        assert!(!is_data_active(None, now()));
        assert!(!is_data_active(Some(now() - Duration::hours(2)), now()));
        assert!(is_data_active(Some(now() - Duration::minutes(59)), now()));
        assert!(is_data_active(Some(activity_cutoff(now())), now()));
    }

    #[test]
    fn test_future_reading_is_active() {
        assert!(is_data_active(Some(now() + Duration::seconds(2)), now()));
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&FreshnessStatus::Recent).unwrap(),
            "\"recent\""
        );
        assert_eq!(
            serde_json::to_string(&FreshnessStatus::Stale).unwrap(),
            "\"stale\""
        );
    }
}
