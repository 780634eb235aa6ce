//! BACpipes Window Statistics
//!
//! Rollups over a trailing window of readings, computed inside the store so
//! that a day of rows never has to cross the adapter boundary.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use bacpipes_common::Reading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Types
// =============================================================================

/// Rollup of one series over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointStats {
    /// Display name of the series' latest reading, falling back to the key.
    pub point_name: String,
    pub haystack_name: String,
    pub count: u64,
    pub avg_value: f64,
    pub first_reading: DateTime<Utc>,
    pub last_reading: DateTime<Utc>,
}

/// Aggregates over every reading at or after the window start.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowStats {
    pub unique_points: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    /// Readings at or after the activity cutoff.
    pub recent_count: u64,
    /// Busiest series first, ties by ascending key.
    pub point_stats: Vec<PointStats>,
}

#[derive(Debug)]
struct Accumulator<'a> {
    latest: &'a Reading,
    count: u64,
    sum: f64,
    first: DateTime<Utc>,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Single pass over rows already restricted to the window.
///
/// Point rollups are ranked by record count, ties broken by series key, and
/// truncated to `top_points`.
pub fn aggregate<'a, I>(
    readings: I,
    activity_since: DateTime<Utc>,
    top_points: usize,
) -> WindowStats
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut per_series: HashMap<&str, Accumulator<'_>> = HashMap::new();
    let mut oldest: Option<DateTime<Utc>> = None;
    let mut newest: Option<DateTime<Utc>> = None;
    let mut recent_count = 0u64;

    for reading in readings {
        let ts = reading.timestamp;
        oldest = Some(oldest.map_or(ts, |o| o.min(ts)));
        newest = Some(newest.map_or(ts, |n| n.max(ts)));
        if ts >= activity_since {
            recent_count += 1;
        }

        per_series
            .entry(reading.series_key.as_str())
            .and_modify(|acc| {
                acc.count += 1;
                acc.sum += reading.value;
                acc.first = acc.first.min(ts);
                if ts > acc.latest.timestamp {
                    acc.latest = reading;
                }
            })
            .or_insert(Accumulator {
                latest: reading,
                count: 1,
                sum: reading.value,
                first: ts,
            });
    }

    let unique_points = per_series.len() as u64;
    let mut point_stats: Vec<PointStats> = per_series
        .into_iter()
        .map(|(key, acc)| PointStats {
            point_name: acc.latest.effective_name().to_string(),
            haystack_name: key.to_string(),
            count: acc.count,
            avg_value: acc.sum / acc.count as f64,
            first_reading: acc.first,
            last_reading: acc.latest.timestamp,
        })
        .collect();
    point_stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.haystack_name.cmp(&b.haystack_name))
    });
    point_stats.truncate(top_points);

    WindowStats {
        unique_points,
        oldest,
        newest,
        recent_count,
        point_stats,
    }
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

    fn ago(minutes: i64) -> DateTime<Utc> {
        now() - Duration::minutes(minutes)
    }

    #[test]
    fn test_empty_window() {
        let stats = aggregate(std::iter::empty(), ago(60), 20);
        assert_eq!(stats, WindowStats::default());
    }

    #[test]
    fn test_rollup_uses_latest_display_name() {
        let readings = vec![
            Reading::new(ago(30), "ahu1/sat", 54.0).with_display_name("old name"),
            Reading::new(ago(2), "ahu1/sat", 56.0).with_display_name("AHU-1 SAT"),
            Reading::new(ago(300), "ahu1/sat", 52.0),
            Reading::new(ago(90), "vav2/zone", 71.0).with_display_name("  "),
        ];
        let stats = aggregate(&readings, ago(60), 20);

        assert_eq!(stats.unique_points, 2);
        assert_eq!(stats.oldest, Some(ago(300)));
        assert_eq!(stats.newest, Some(ago(2)));
        assert_eq!(stats.recent_count, 2);

        let ahu = &stats.point_stats[0];
        assert_eq!(ahu.point_name, "AHU-1 SAT");
        assert_eq!(ahu.count, 3);
        assert_eq!(ahu.avg_value, 54.0);
        assert_eq!(ahu.first_reading, ago(300));
        assert_eq!(ahu.last_reading, ago(2));
        assert_eq!(stats.point_stats[1].point_name, "vav2/zone");
    }

    #[test]
    fn test_future_readings_count_as_recent() {
        let readings = vec![
            Reading::new(ago(120), "k", 1.0),
            Reading::new(now() + Duration::seconds(2), "k", 2.0),
            Reading::new(now() + Duration::seconds(3), "skewed", 9.0),
        ];
        let stats = aggregate(&readings, ago(60), 20);

        assert_eq!(stats.unique_points, 2);
        assert_eq!(stats.newest, Some(now() + Duration::seconds(3)));
        assert_eq!(stats.recent_count, 2);
    }

    #[test]
    fn test_top_points_limit_and_tie_order() {
        let mut readings = Vec::new();
        for i in 0..25 {
            let key = format!("p{i:02}");
            let copies = if i == 24 { 3 } else { 1 };
            for c in 0..copies {
                readings.push(Reading::new(ago(c + 1), key.clone(), 1.0));
            }
        }
        let stats = aggregate(&readings, ago(60), 20);

        assert_eq!(stats.unique_points, 25);
        assert_eq!(stats.point_stats.len(), 20);
        assert_eq!(stats.point_stats[0].haystack_name, "p24");
        assert_eq!(stats.point_stats[1].haystack_name, "p00");
        assert_eq!(stats.point_stats[19].haystack_name, "p18");
    }
}
