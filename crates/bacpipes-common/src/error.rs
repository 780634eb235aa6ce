//! BACpipes Error - Unified Error Types
//!
//! Every failure a request can end in falls into one of two buckets: the
//! caller sent something malformed (validation), or the reading store could
//! not answer (store unavailable). An empty result is never an error.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Unified error type for all BACpipes operations.
#[derive(Error, Debug)]
pub enum BacpipesError {
    /// A required request parameter is missing or malformed.
    #[error("invalid parameter '{field}': {message}")]
    Validation { field: String, message: String },

    /// The reading store failed to connect, query or respond in time.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for BACpipes operations.
pub type Result<T> = std::result::Result<T, BacpipesError>;

// =============================================================================
// Constructors & Classification
// =============================================================================

impl BacpipesError {
    /// Build a validation error for a named request field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if this is the caller's fault.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// The offending field name for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
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
    fn test_validation_display() {
        let err = BacpipesError::validation("point", "Point parameter is required");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'point': Point parameter is required"
        );
        assert_eq!(err.field(), Some("point"));
    }

    #[test]
    fn test_classification() {
        let err = BacpipesError::validation("limit", "must be positive");
        assert!(err.is_user_error());
        assert!(!err.is_retryable());

        let err = BacpipesError::StoreUnavailable("connection refused".to_string());
        assert!(!err.is_user_error());
        assert!(err.is_retryable());
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BacpipesError = io.into();
        assert!(matches!(err, BacpipesError::Io(_)));
    }
}
