//! BACpipes PostgreSQL Store
//!
//! `ReadingStore` over the TimescaleDB `sensor_readings` hypertable written
//! by the acquisition pipeline. Columns: `time` (timestamptz),
//! `haystack_name`, `dis`, `value`, `units`, `quality`.
//!
//! All request-derived values travel as bound parameters. The table name is
//! the only interpolated identifier and comes from validated configuration.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::query::{ReadingOrder, ReadingQuery};
use crate::stats::{PointStats, WindowStats};
use crate::store::{ReadingStore, StorageFootprint};
use async_trait::async_trait;
use bacpipes_common::{display_or_key, Reading};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::time::Duration;

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ReadingRow {
    time: DateTime<Utc>,
    haystack_name: String,
    dis: Option<String>,
    value: f64,
    units: Option<String>,
    quality: Option<String>,
}

impl From<ReadingRow> for Reading {
    fn from(row: ReadingRow) -> Self {
        Reading {
            timestamp: row.time,
            series_key: row.haystack_name,
            display_name: row.dis,
            value: row.value,
            unit: row.units,
            quality: row.quality.unwrap_or_default().into(),
        }
    }
}

/// One output row of the window rollup: the window totals repeated on every
/// row, joined with one series rollup (absent when the window is empty).
#[derive(Debug, sqlx::FromRow)]
struct WindowStatsRow {
    unique_points: i64,
    oldest: Option<DateTime<Utc>>,
    newest: Option<DateTime<Utc>>,
    recent_count: i64,
    haystack_name: Option<String>,
    dis: Option<String>,
    count: Option<i64>,
    avg_value: Option<f64>,
    first_reading: Option<DateTime<Utc>>,
    last_reading: Option<DateTime<Utc>>,
}

impl WindowStatsRow {
    fn point_stats(self) -> Option<PointStats> {
        let haystack_name = self.haystack_name?;
        Some(PointStats {
            point_name: display_or_key(self.dis.as_deref(), &haystack_name).to_string(),
            count: self.count?.max(0) as u64,
            avg_value: self.avg_value?,
            first_reading: self.first_reading?,
            last_reading: self.last_reading?,
            haystack_name,
        })
    }
}

fn collect_window_stats(rows: Vec<WindowStatsRow>) -> WindowStats {
    let Some(first) = rows.first() else {
        return WindowStats::default();
    };
    let mut stats = WindowStats {
        unique_points: first.unique_points.max(0) as u64,
        oldest: first.oldest,
        newest: first.newest,
        recent_count: first.recent_count.max(0) as u64,
        point_stats: Vec::with_capacity(rows.len()),
    };
    stats
        .point_stats
        .extend(rows.into_iter().filter_map(WindowStatsRow::point_stats));
    stats
}

// =============================================================================
// SQL
// =============================================================================

/// Statements prepared once per store from the configured table.
#[derive(Debug, Clone)]
struct Statements {
    fetch_by_time: String,
    fetch_by_time_and_key: String,
    window_stats: String,
    approximate_count: &'static str,
    footprint: &'static str,
}

impl Statements {
    fn new(table: &str) -> Self {
        let select = format!(
            "SELECT time, haystack_name, dis, value::float8 AS value, units, quality \
             FROM {table} \
             WHERE time >= $1 AND ($2::timestamptz IS NULL OR time <= $2) \
               AND ($3::text IS NULL OR haystack_name = $3)"
        );
        // $1 window start, $2 activity cutoff, $3 rollup limit.
        let window_stats = format!(
            "WITH w AS ( \
                 SELECT time, haystack_name, dis, value::float8 AS value \
                 FROM {table} WHERE time >= $1 \
             ), totals AS ( \
                 SELECT COUNT(DISTINCT haystack_name) AS unique_points, \
                        MIN(time) AS oldest, MAX(time) AS newest, \
                        COUNT(*) FILTER (WHERE time >= $2) AS recent_count \
                 FROM w \
             ), top AS ( \
                 SELECT haystack_name, \
                        (ARRAY_AGG(dis ORDER BY time DESC))[1] AS dis, \
                        COUNT(*) AS count, AVG(value) AS avg_value, \
                        MIN(time) AS first_reading, MAX(time) AS last_reading \
                 FROM w GROUP BY haystack_name \
                 ORDER BY count DESC, haystack_name ASC LIMIT $3 \
             ) \
             SELECT t.unique_points, t.oldest, t.newest, t.recent_count, \
                    p.haystack_name, p.dis, p.count, p.avg_value, \
                    p.first_reading, p.last_reading \
             FROM totals t LEFT JOIN top p ON true \
             ORDER BY p.count DESC NULLS LAST, p.haystack_name ASC"
        );
        Self {
            fetch_by_time: format!("{select} ORDER BY time ASC"),
            fetch_by_time_and_key: format!("{select} ORDER BY time ASC, haystack_name ASC"),
            window_stats,
            approximate_count: "SELECT n_live_tup::bigint FROM pg_stat_user_tables \
                                WHERE relname = $1",
            footprint: "SELECT pg_size_pretty(pg_database_size(current_database())), \
                        pg_size_pretty(pg_total_relation_size($1::text::regclass)), \
                        pg_size_pretty(pg_indexes_size($1::text::regclass))",
        }
    }

    fn fetch(&self, order: ReadingOrder) -> &str {
        match order {
            ReadingOrder::Timestamp => &self.fetch_by_time,
            ReadingOrder::TimestampThenKey => &self.fetch_by_time_and_key,
        }
    }
}

// =============================================================================
// PostgreSQL Store
// =============================================================================

/// Pooled PostgreSQL reading store.
#[derive(Debug, Clone)]
pub struct PgReadingStore {
    pool: PgPool,
    table: String,
    statements: Statements,
    query_timeout: Duration,
}

impl PgReadingStore {
    /// Create a store with a lazily connecting pool.
    ///
    /// No connection is opened until the first query, so the server can
    /// start while the database is down; requests then fail individually.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StoreError::InvalidConfig("database_url is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy(url)?;

        Ok(Self {
            pool,
            table: config.table.clone(),
            statements: Statements::new(&config.table),
            query_timeout: config.query_timeout(),
        })
    }

    /// Round-trip a trivial statement to confirm connectivity.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.timed(sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map(|_| ())
    }

    async fn timed<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let result = match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.query_timeout.as_secs())),
        };
        if let Err(e) = &result {
            tracing::warn!(error = %e, retryable = e.is_retryable(), "store query failed");
        }
        result
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn fetch(&self, query: &ReadingQuery) -> Result<Vec<Reading>, StoreError> {
        let sql = self.statements.fetch(query.order);
        let rows: Vec<ReadingRow> = self
            .timed(
                sqlx::query_as::<_, ReadingRow>(sql)
                    .bind(query.start)
                    .bind(query.end)
                    .bind(query.series_key.as_deref())
                    .fetch_all(&self.pool),
            )
            .await?;

        tracing::debug!(
            rows = rows.len(),
            start = %query.start,
            end = ?query.end,
            "fetched readings"
        );
        Ok(rows.into_iter().map(Reading::from).collect())
    }

    async fn approximate_count(&self) -> Result<u64, StoreError> {
        let row: Option<(Option<i64>,)> = self
            .timed(
                sqlx::query_as(self.statements.approximate_count)
                    .bind(&self.table)
                    .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row
            .and_then(|(count,)| count)
            .map(|count| count.max(0) as u64)
            .unwrap_or(0))
    }

    async fn footprint(&self) -> Result<StorageFootprint, StoreError> {
        let (database_size, table_size, index_size): (
            Option<String>,
            Option<String>,
            Option<String>,
        ) = self
            .timed(
                sqlx::query_as(self.statements.footprint)
                    .bind(&self.table)
                    .fetch_one(&self.pool),
            )
            .await?;

        let unknown = StorageFootprint::unknown();
        Ok(StorageFootprint {
            database_size: database_size.unwrap_or(unknown.database_size),
            table_size: table_size.unwrap_or(unknown.table_size),
            index_size: index_size.unwrap_or(unknown.index_size),
        })
    }

    async fn window_stats(
        &self,
        since: DateTime<Utc>,
        activity_since: DateTime<Utc>,
        top_points: usize,
    ) -> Result<WindowStats, StoreError> {
        let rows: Vec<WindowStatsRow> = self
            .timed(
                sqlx::query_as::<_, WindowStatsRow>(&self.statements.window_stats)
                    .bind(since)
                    .bind(activity_since)
                    .bind(i64::try_from(top_points).unwrap_or(i64::MAX))
                    .fetch_all(&self.pool),
            )
            .await?;

        tracing::debug!(rows = rows.len(), since = %since, "aggregated window stats");
        Ok(collect_window_stats(rows))
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bacpipes_common::{BacpipesError, Quality};
    use chrono::TimeZone;

    #[test]
    fn test_statements_bind_all_filters() {
        let statements = Statements::new("sensor_readings");
        let sql = statements.fetch(ReadingOrder::Timestamp);
        assert!(sql.contains("FROM sensor_readings"));
        assert!(sql.contains("time >= $1 AND ($2::timestamptz IS NULL OR time <= $2)"));
        assert!(sql.contains("haystack_name = $3"));
        assert!(sql.ends_with("ORDER BY time ASC"));

        let sql = statements.fetch(ReadingOrder::TimestampThenKey);
        assert!(sql.ends_with("ORDER BY time ASC, haystack_name ASC"));
    }

    #[test]
    fn test_window_stats_statement_aggregates_in_sql() {
        let sql = Statements::new("sensor_readings").window_stats;
        assert!(sql.contains("FROM sensor_readings WHERE time >= $1"));
        assert!(!sql.contains("<="));
        assert!(sql.contains("COUNT(*) FILTER (WHERE time >= $2)"));
        assert!(sql.contains("GROUP BY haystack_name"));
        assert!(sql.contains("LIMIT $3"));
    }

    fn stats_row(key: Option<&str>, dis: Option<&str>, count: i64) -> WindowStatsRow {
        let time = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        WindowStatsRow {
            unique_points: 2,
            oldest: Some(time),
            newest: Some(time),
            recent_count: 3,
            haystack_name: key.map(str::to_string),
            dis: dis.map(str::to_string),
            count: key.map(|_| count),
            avg_value: key.map(|_| 1.5),
            first_reading: key.map(|_| time),
            last_reading: key.map(|_| time),
        }
    }

    #[test]
    fn test_collect_window_stats() {
        let stats = collect_window_stats(vec![
            stats_row(Some("a"), Some("Zone Temp"), 4),
            stats_row(Some("b"), Some(" "), 1),
        ]);
        assert_eq!(stats.unique_points, 2);
        assert_eq!(stats.recent_count, 3);
        assert_eq!(stats.point_stats.len(), 2);
        assert_eq!(stats.point_stats[0].point_name, "Zone Temp");
        assert_eq!(stats.point_stats[0].count, 4);
        assert_eq!(stats.point_stats[1].point_name, "b");
    }

    #[test]
    fn test_collect_empty_window() {
        let mut row = stats_row(None, None, 0);
        row.unique_points = 0;
        row.recent_count = 0;
        row.oldest = None;
        row.newest = None;

        assert_eq!(collect_window_stats(vec![row]), WindowStats::default());
        assert_eq!(collect_window_stats(Vec::new()), WindowStats::default());
    }

    #[test]
    fn test_row_conversion() {
        let time = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        let reading: Reading = ReadingRow {
            time,
            haystack_name: "site/ahu1/sat".to_string(),
            dis: None,
            value: 55.25,
            units: Some("°F".to_string()),
            quality: None,
        }
        .into();

        assert_eq!(reading.timestamp, time);
        assert_eq!(reading.effective_name(), "site/ahu1/sat");
        assert_eq!(reading.quality, Quality::Other(String::new()));

        let reading: Reading = ReadingRow {
            time,
            haystack_name: "k".to_string(),
            dis: Some("Zone Temp".to_string()),
            value: 1.0,
            units: None,
            quality: Some("good".to_string()),
        }
        .into();
        assert_eq!(reading.quality, Quality::Good);
        assert_eq!(reading.effective_name(), "Zone Temp");
    }

    #[tokio::test]
    async fn test_new_requires_url() {
        let result = PgReadingStore::new(&StoreConfig::default());
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_new_rejects_bad_table() {
        let config = StoreConfig::from_url("postgres://localhost/telemetry")
            .unwrap()
            .with_table("x; --");
        assert!(matches!(
            PgReadingStore::new(&config),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_pool_refuses_queries() {
        let config = StoreConfig::from_url("postgres://bacpipes@127.0.0.1:1/telemetry").unwrap();
        let store = PgReadingStore::new(&config).unwrap();
        store.close().await;

        let err = store
            .fetch(&ReadingQuery::since(Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_database_is_store_unavailable() {
        let mut config = StoreConfig::from_url("postgres://bacpipes@127.0.0.1:1/telemetry")
            .unwrap()
            .with_query_timeout(Duration::from_secs(2));
        config.acquire_timeout_secs = 1;

        let store = PgReadingStore::new(&config).unwrap();
        let now = Utc::now();
        let err = store
            .fetch(&ReadingQuery::between(now - chrono::Duration::hours(1), now))
            .await
            .unwrap_err();

        assert!(matches!(
            BacpipesError::from(err),
            BacpipesError::StoreUnavailable(_)
        ));
    }
}
