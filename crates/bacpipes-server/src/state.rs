//! BACpipes Server State
//!
//! Shared handles for request handlers: the reading store and the clock.
//! Nothing in here is mutated after startup.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::config::ServerConfig;
use bacpipes_common::{Clock, Result, SystemClock};
use bacpipes_store::{MemoryStore, PgReadingStore, ReadingStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;

// =============================================================================
// Application State
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock, e.g. with a `MockClock` in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The instant every operation in one request is evaluated at.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn store(&self) -> &dyn ReadingStore {
        self.store.as_ref()
    }
}

// =============================================================================
// Store Selection
// =============================================================================

/// Open the configured reading store.
///
/// A database URL selects PostgreSQL; an unreachable database is logged but
/// does not stop startup. Without a URL the in-memory store is used,
/// optionally preloaded from `data_file`.
pub async fn connect_store(config: &ServerConfig) -> Result<Arc<dyn ReadingStore>> {
    if config.uses_database() {
        let store = PgReadingStore::new(&config.store)?;
        match store.ping().await {
            Ok(()) => tracing::info!(
                table = %config.store.table,
                "Connected to PostgreSQL reading store"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                "PostgreSQL is not reachable yet, requests will fail until it is"
            ),
        }
        return Ok(Arc::new(store));
    }

    tracing::warn!("No database URL configured, serving readings from memory");
    let store = match &config.data_file {
        Some(path) => MemoryStore::load(path)?,
        None => MemoryStore::new(),
    };
    tracing::info!(readings = store.len(), "In-memory reading store ready");
    Ok(Arc::new(store))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bacpipes_common::{MockClock, Reading};
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_memory_store_without_url() {
        let store = connect_store(&ServerConfig::default()).await.unwrap();
        assert_eq!(store.backend(), "memory");
        assert_eq!(store.approximate_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_data_file_fails() {
        let config = ServerConfig::default()
            .with_data_file(Some("/nonexistent/readings.json".into()));
        assert!(connect_store(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_data_file_is_preloaded() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let readings = vec![Reading::new(ts, "site/a", 1.0)];
        let path = std::env::temp_dir().join(format!(
            "bacpipes-state-{}.json",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, serde_json::to_string(&readings).unwrap()).unwrap();

        let config = ServerConfig::default().with_data_file(Some(path.clone()));
        let store = connect_store(&config).await.unwrap();
        assert_eq!(store.approximate_count().await.unwrap(), 1);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_clock_override() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let state = AppState::new(Arc::new(MemoryStore::new()))
            .with_clock(Arc::new(MockClock::with_time(at)));
        assert_eq!(state.now(), at);
    }
}
