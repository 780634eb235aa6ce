//! BACpipes API Errors
//!
//! Maps operation failures onto HTTP responses. Validation problems return
//! 400 with the offending field; store failures return 500 with a generic
//! message for the endpoint and the driver text under `details`.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bacpipes_common::BacpipesError;
use serde::{Deserialize, Serialize};

pub const POINTS_FAILED: &str = "Failed to fetch points";
pub const TREND_FAILED: &str = "Failed to fetch trend data";
pub const EXPORT_FAILED: &str = "Failed to export CSV";
pub const HEALTH_FAILED: &str = "Failed to fetch health stats";

// =============================================================================
// Error Body
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl ToString, code: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl ToString) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn with_details(mut self, details: impl ToString) -> Self {
        self.details = Some(details.to_string());
        self
    }
}

// =============================================================================
// API Error
// =============================================================================

/// A failed request: the endpoint's generic message plus the cause.
#[derive(Debug)]
pub struct ApiError {
    message: &'static str,
    source: BacpipesError,
}

impl ApiError {
    pub fn new(message: &'static str, source: BacpipesError) -> Self {
        Self { message, source }
    }

    pub fn status(&self) -> StatusCode {
        if self.source.is_user_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub fn body(&self) -> ErrorResponse {
        match &self.source {
            BacpipesError::Validation { field, message } => {
                ErrorResponse::new(message, "VALIDATION_ERROR").with_field(field)
            }
            BacpipesError::StoreUnavailable(details) => {
                ErrorResponse::new(self.message, "STORE_UNAVAILABLE").with_details(details)
            }
            other => ErrorResponse::new(self.message, "INTERNAL_ERROR").with_details(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(
                error = %self.source,
                retryable = self.source.is_retryable(),
                "{}",
                self.message
            );
        } else {
            tracing::debug!(error = %self.source, "rejected request");
        }
        (status, Json(self.body())).into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
