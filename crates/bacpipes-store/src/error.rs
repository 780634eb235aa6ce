//! BACpipes Store Error Types
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use bacpipes_common::BacpipesError;
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Errors that can occur while talking to the reading store.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Query timed out after {0}s")]
    Timeout(u64),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl StoreError {
    /// Check if the error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Timeout(_) | Self::PoolExhausted
        )
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::PoolExhausted,
            sqlx::Error::PoolClosed => Self::ConnectionFailed("pool closed".to_string()),
            sqlx::Error::Io(e) => Self::ConnectionFailed(e.to_string()),
            sqlx::Error::Tls(e) => Self::ConnectionFailed(e.to_string()),
            sqlx::Error::Configuration(e) => Self::InvalidConfig(e.to_string()),
            other => Self::QueryFailed(other.to_string()),
        }
    }
}

impl From<StoreError> for BacpipesError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidConfig(msg) | StoreError::InvalidUrl(msg) => {
                BacpipesError::Configuration(msg)
            }
            other => BacpipesError::StoreUnavailable(other.to_string()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::ConnectionFailed("refused".to_string());
        assert_eq!(err.to_string(), "Connection failed: refused");
        assert_eq!(StoreError::Timeout(5).to_string(), "Query timed out after 5s");
    }

    #[test]
    fn test_is_retryable() {
        assert!(StoreError::Timeout(30).is_retryable());
        assert!(StoreError::PoolExhausted.is_retryable());
        assert!(!StoreError::QueryFailed("syntax".to_string()).is_retryable());
    }

    #[test]
    fn test_timeout_maps_to_store_unavailable() {
        let err: BacpipesError = StoreError::Timeout(10).into();
        match err {
            BacpipesError::StoreUnavailable(detail) => {
                assert_eq!(detail, "Query timed out after 10s")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pool_timeout_conversion() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::PoolExhausted));
    }
}
