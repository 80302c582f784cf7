//! # Store Error Types
//!
//! Error types for remote cart store and auth calls.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │    Backend      │  │     Local               │ │
//! │  │  (retryable)    │  │                 │  │                         │ │
//! │  │  Http           │  │  Unauthorized   │  │  Config                 │ │
//! │  │  Timeout        │  │  NotFound       │  │  Decode                 │ │
//! │  │  Unavailable    │  │  Status{..}     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Status is retryable for 429 and 5xx only.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error type covering all remote call failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or rejected credentials.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The addressed cart entry does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Connection-level failure (DNS, TLS, reset).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A single attempt took longer than the configured timeout.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Invalid store configuration.
    #[error("Invalid store configuration: {0}")]
    Config(String),

    /// The backend is temporarily unable to serve the request.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            StoreError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            StoreError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for StoreError {
    fn from(err: url::ParseError) -> Self {
        StoreError::Config(format!("invalid URL: {err}"))
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl StoreError {
    /// Returns true if the call may succeed when repeated.
    ///
    /// ## Retryable Errors
    /// - Connection failures and timeouts
    /// - 429 and 5xx responses
    /// - `Unavailable`
    ///
    /// ## Non-Retryable Errors
    /// - Auth failures, missing entries, other 4xx
    /// - Decode and configuration errors
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Http(_) | StoreError::Timeout(_) | StoreError::Unavailable(_) => true,
            StoreError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            StoreError::Unauthorized(_)
            | StoreError::NotFound { .. }
            | StoreError::Decode(_)
            | StoreError::Config(_) => false,
        }
    }

    /// Builds the error for a non-success HTTP status.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => StoreError::Unauthorized(body),
            503 => StoreError::Unavailable(body),
            _ => StoreError::Status { status, body },
        }
    }
}
