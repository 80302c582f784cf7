//! # API Error Type
//!
//! The error and notice shapes the presentation layer receives.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Error Flow in the Cart View                         │
//! │                                                                         │
//! │  CoreError::InvalidCoupon ───────► INVALID_COUPON   (not retryable)    │
//! │  CoreError::StockExceeded ───────► STOCK_EXCEEDED   (not retryable)    │
//! │  CoreError::LineItemNotFound ────► NOT_FOUND                           │
//! │  CoreError::Validation ──────────► VALIDATION_ERROR                    │
//! │                                                                         │
//! │  StoreError during load ─────────► FETCH_FAILED     ──┐                │
//! │  StoreError during a write ──────► MUTATION_FAILED  ──┤ retryable      │
//! │  StoreError::Unauthorized ───────► UNAUTHORIZED       │ follows the    │
//! │                                                       │ store error    │
//! │                                    Notice { level: error, .. } ◄──┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! {
//!   "code": "MUTATION_FAILED",
//!   "message": "Could not update quantity: Request timed out after 10000ms",
//!   "retryable": true
//! }
//! ```

use serde::Serialize;
use shopfront_core::CoreError;
use shopfront_store::StoreError;
use ts_rs::TS;

/// Error returned from cart view operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Whether offering "try again" makes sense
    pub retryable: bool,
}

/// Error codes for view responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Loading the cart failed
    FetchFailed,

    /// A quantity change, removal or wishlist move was not persisted
    MutationFailed,

    /// Unknown coupon code
    InvalidCoupon,

    /// Requested quantity above stock
    StockExceeded,

    NotFound,

    ValidationError,

    /// Session missing or expired
    Unauthorized,
}

impl ApiError {
    /// Creates a new, non-retryable API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            retryable: false,
        }
    }

    /// Marks the error as retryable.
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// A failed cart load.
    pub fn fetch_failed(err: &StoreError) -> Self {
        if let StoreError::Unauthorized(_) = err {
            return ApiError::new(ErrorCode::Unauthorized, "Your session has expired. Sign in again.");
        }
        ApiError::new(ErrorCode::FetchFailed, format!("Could not load your cart: {}", err))
            .retryable(err.is_retryable())
    }

    /// A failed write; `action` reads like "update quantity".
    pub fn mutation_failed(action: &str, err: &StoreError) -> Self {
        if let StoreError::Unauthorized(_) = err {
            return ApiError::new(ErrorCode::Unauthorized, "Your session has expired. Sign in again.");
        }
        ApiError::new(
            ErrorCode::MutationFailed,
            format!("Could not {}: {}", action, err),
        )
        .retryable(err.is_retryable())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidCoupon { code } => ApiError::new(
                ErrorCode::InvalidCoupon,
                format!("Invalid coupon code: {}", code),
            ),
            err @ CoreError::StockExceeded { .. } => {
                ApiError::new(ErrorCode::StockExceeded, err.to_string())
            }
            CoreError::LineItemNotFound(id) => ApiError::not_found("Cart entry", &id),
            err @ CoreError::InvalidState { .. } => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            CoreError::Validation(e) => ApiError::new(ErrorCode::ValidationError, e.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Notice
// =============================================================================

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A one-line message for the shopper after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Set for error notices.
    pub code: Option<ErrorCode>,
    pub retryable: bool,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
            code: None,
            retryable: false,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl From<&ApiError> for Notice {
    fn from(err: &ApiError) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: err.message.clone(),
            code: Some(err.code),
            retryable: err.retryable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::InvalidCoupon { code: "SAVE50".into() }.into();
        assert_eq!(err.code, ErrorCode::InvalidCoupon);
        assert!(!err.retryable);

        let err: ApiError = CoreError::StockExceeded {
            name: "Sneakers".into(),
            available: 2,
            requested: 3,
        }
        .into();
        assert_eq!(err.code, ErrorCode::StockExceeded);
        assert_eq!(err.message, "Only 2 of Sneakers in stock, requested 3");

        let err: ApiError = CoreError::LineItemNotFound("row-9".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_store_errors_keep_retryability() {
        let err = ApiError::fetch_failed(&StoreError::Timeout(Duration::from_secs(10)));
        assert_eq!(err.code, ErrorCode::FetchFailed);
        assert!(err.retryable);

        let err = ApiError::mutation_failed(
            "remove item",
            &StoreError::Status { status: 400, body: "bad".into() },
        );
        assert_eq!(err.code, ErrorCode::MutationFailed);
        assert!(!err.retryable);
        assert!(err.message.starts_with("Could not remove item"));

        let err = ApiError::mutation_failed("remove item", &StoreError::Unauthorized("jwt".into()));
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_serialization() {
        let err = ApiError::new(ErrorCode::MutationFailed, "nope").retryable(true);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "MUTATION_FAILED");
        assert_eq!(json["retryable"], true);

        let notice = Notice::from(&err);
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["code"], "MUTATION_FAILED");
    }
}
