//! # Validation Module
//!
//! Input validation for values that reach the cart from the shopper or
//! from configuration.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Presentation                                                  │
//! │  ├── Increment disabled at stock, decrement disabled at 1               │
//! │  └── Immediate feedback                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart engine (THIS MODULE + cart.rs)                           │
//! │  ├── Coupon code format                                                 │
//! │  └── Quantity / rate bounds                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Hosted backend                                                │
//! │  └── Row-level constraints                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest coupon code accepted.
pub const MAX_COUPON_CODE_LEN: usize = 32;

/// 100% in basis points.
pub const MAX_RATE_BPS: u32 = 10_000;

/// Validates a coupon code and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 32 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use shopfront_core::validation::validate_coupon_code;
///
/// assert_eq!(validate_coupon_code("  SAVE10 ").unwrap(), "SAVE10");
/// assert!(validate_coupon_code("").is_err());
/// assert!(validate_coupon_code("SAVE 10").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon code".to_string(),
        });
    }

    if code.len() > MAX_COUPON_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "coupon code".to_string(),
            max: MAX_COUPON_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "coupon code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_string())
}

/// Validates a rate in basis points (0% to 100%).
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > MAX_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::from(MAX_RATE_BPS),
        });
    }

    Ok(())
}

/// Validates that an amount is not negative.
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    Ok(())
}
