//! API error handling.
//!
//! Every failure leaves the service as `{"error": "<message>"}` with the
//! matching status code. Store failures are logged here with full detail and
//! reach the caller only as an opaque message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::RepositoryError;

/// Message returned for missing or empty todo text.
pub const TEXT_REQUIRED: &str = "Text is required";
/// Message returned when the id matches no row.
pub const TODO_NOT_FOUND: &str = "Todo not found";
/// Opaque message returned for store failures.
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

// =============================================================================
// API Error
// =============================================================================

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
}

impl ApiError {
    /// Creates a new API error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error body.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiError::new(message))
    }

    /// Creates the 404 response for an id with no matching row.
    #[must_use]
    pub fn todo_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new(TODO_NOT_FOUND))
    }

    /// Creates the opaque 500 response.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new(INTERNAL_SERVER_ERROR),
        )
    }

    /// Logs a store failure for `operation` and converts it to the opaque 500.
    #[must_use]
    pub fn store_failure(operation: &'static str, error: &RepositoryError) -> Self {
        tracing::error!(operation, %error, "todo store operation failed");
        Self::internal_error()
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rejected client input. Always produced before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Message sent to the client.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error for missing or empty todo text.
    #[must_use]
    pub fn text_required() -> Self {
        Self::new(TEXT_REQUIRED)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        Self::bad_request(error.message)
    }
}
