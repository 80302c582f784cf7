//! # Error Types
//!
//! Domain-specific error types for shopfront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopfront-core errors (this file)                                     │
//! │  ├── CoreError        - Cart rule violations                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopfront-store errors (separate crate)                               │
//! │  └── StoreError       - Backend call failures                          │
//! │                                                                         │
//! │  cart view errors (in app)                                             │
//! │  └── ApiError         - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                         StoreError ─┴─► ApiError → Notice              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The coupon code is not known to the coupon book.
    ///
    /// ## User Workflow
    /// ```text
    /// Enter "SAVE50" ──► apply_coupon ──► InvalidCoupon { code: "SAVE50" }
    ///                                           │
    ///                                           ▼
    ///                                UI shows: "Invalid coupon code"
    /// ```
    #[error("Invalid coupon code: {code}")]
    InvalidCoupon { code: String },

    /// Requested quantity is more than the stock available.
    #[error("Only {available} of {name} in stock, requested {requested}")]
    StockExceeded {
        name: String,
        available: i64,
        requested: i64,
    },

    /// No line item has the given cart entry id.
    #[error("Cart entry not found: {0}")]
    LineItemNotFound(String),

    /// Operation not allowed in the cart's current state.
    #[error("Cannot {operation} while the cart is {state}")]
    InvalidState { operation: String, state: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::StockExceeded {
            name: "Denim Jacket".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Only 3 of Denim Jacket in stock, requested 5"
        );

        let err = CoreError::InvalidCoupon {
            code: "SAVE50".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid coupon code: SAVE50");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "coupon code".to_string(),
        };
        assert_eq!(validation_err.to_string(), "coupon code is required");

        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
