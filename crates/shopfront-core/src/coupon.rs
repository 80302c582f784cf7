//! # Coupons
//!
//! Coupon lookup is a seam: the cart asks a [`CouponLookup`] what a code is
//! worth and never hard-codes codes itself.
//!
//! ```text
//! "  SAVE10 " ──► validate_coupon_code ──► "SAVE10"
//!                                             │
//!                                             ▼
//!                              CouponLookup::lookup("SAVE10")
//!                                   │                 │
//!                          Some(DiscountRule)        None
//!                                   │                 │
//!                                   ▼                 ▼
//!                        Coupon { 10% }      CoreError::InvalidCoupon
//! ```
//!
//! [`StaticCouponBook`] is the in-process book. A real deployment would
//! validate codes server-side (expiry, stacking rules) behind the same trait.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Rate;
use crate::types::Coupon;
use crate::validation::{validate_coupon_code, validate_rate_bps};

/// What a coupon code is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRule {
    /// Percentage taken off the subtotal, 0% to 100%.
    pub discount_rate: Rate,
}

impl DiscountRule {
    /// A percentage-off rule.
    pub const fn percent_off(pct: u32) -> Self {
        DiscountRule {
            discount_rate: Rate::from_percentage(pct),
        }
    }
}

/// Resolves coupon codes to discount rules.
pub trait CouponLookup: Send + Sync {
    /// Returns the rule for an already-trimmed code, or `None` if unknown.
    fn lookup(&self, code: &str) -> Option<DiscountRule>;
}

/// Fixed table of codes, matched case-sensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticCouponBook {
    rules: HashMap<String, DiscountRule>,
}

impl StaticCouponBook {
    /// An empty book; every code is rejected.
    pub fn new() -> Self {
        Self::default()
    }

    /// The storefront's standard book: `SAVE10` for 10% off.
    pub fn standard() -> Self {
        let mut book = Self::new();
        book.rules
            .insert("SAVE10".to_string(), DiscountRule::percent_off(10));
        book
    }

    /// Adds or replaces a code.
    pub fn insert(&mut self, code: impl Into<String>, rule: DiscountRule) -> CoreResult<()> {
        let code = validate_coupon_code(&code.into())?;
        validate_rate_bps("discount", rule.discount_rate.bps())?;
        self.rules.insert(code, rule);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, code: impl Into<String>, rule: DiscountRule) -> CoreResult<Self> {
        self.insert(code, rule)?;
        Ok(self)
    }

    /// Number of known codes.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the book has no codes.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl CouponLookup for StaticCouponBook {
    fn lookup(&self, code: &str) -> Option<DiscountRule> {
        self.rules.get(code).copied()
    }
}

/// Resolves a shopper-entered code into a [`Coupon`].
///
/// ## Errors
/// - `Validation` for empty or malformed codes
/// - `InvalidCoupon` for well-formed codes the book does not know
///
/// ## Example
/// ```rust
/// use shopfront_core::coupon::{apply_coupon, StaticCouponBook};
///
/// let book = StaticCouponBook::standard();
/// let coupon = apply_coupon(" SAVE10", &book).unwrap();
/// assert_eq!(coupon.code, "SAVE10");
/// assert!(apply_coupon("SAVE50", &book).is_err());
/// ```
pub fn apply_coupon(code: &str, coupons: &dyn CouponLookup) -> CoreResult<Coupon> {
    let code = validate_coupon_code(code)?;

    match coupons.lookup(&code) {
        Some(rule) => Ok(Coupon {
            code,
            discount_rate: rule.discount_rate,
        }),
        None => Err(CoreError::InvalidCoupon { code }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_book_knows_save10() {
        let coupon = apply_coupon("SAVE10", &StaticCouponBook::standard()).unwrap();
        assert_eq!(coupon.discount_rate, Rate::from_percentage(10));
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = apply_coupon("FREESHIP", &StaticCouponBook::standard()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCoupon { ref code } if code == "FREESHIP"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let err = apply_coupon("save10", &StaticCouponBook::standard()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCoupon { .. }));
    }

    #[test]
    fn test_empty_code_is_validation_error() {
        let err = apply_coupon("   ", &StaticCouponBook::standard()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_custom_book() {
        let book = StaticCouponBook::new()
            .with("WELCOME25", DiscountRule::percent_off(25))
            .unwrap();
        assert_eq!(book.len(), 1);

        let coupon = apply_coupon("WELCOME25", &book).unwrap();
        assert_eq!(coupon.discount_rate.bps(), 2500);
        assert!(apply_coupon("SAVE10", &book).is_err());
    }

    #[test]
    fn test_rule_over_100_percent_rejected() {
        let mut book = StaticCouponBook::new();
        let result = book.insert("GREEDY", DiscountRule::percent_off(150));
        assert!(result.is_err());
        assert!(book.is_empty());

        // Huge percentages saturate instead of overflowing, then fail validation
        assert!(book.insert("HUGE", DiscountRule::percent_off(u32::MAX)).is_err());
        assert!(book.is_empty());
    }
}
