//! # Order Summary Pricing
//!
//! Computes the order summary from the line items and the applied coupon.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. subtotal  = Σ unit_price × quantity                                 │
//! │  2. discount  = coupon ? subtotal × discount% : 0                       │
//! │  3. tax       = (subtotal − discount) × tax_rate      ← post-discount   │
//! │  4. shipping  = subtotal > threshold ? 0 : flat_fee   ← PRE-discount    │
//! │  5. total     = subtotal − discount + tax + shipping                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 3 and 4 look at different bases on purpose: a coupon can take a
//! cart below the free-shipping threshold without losing free shipping.
//! The asymmetry is long-standing storefront behaviour and is kept as is.
//!
//! Nothing is rounded here. [`Money`]'s `Display` rounds to two places.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::{Money, Rate};
use crate::types::{Coupon, LineItem, OrderSummary};
use crate::validation::{validate_non_negative, validate_rate_bps};
use crate::{DEFAULT_FLAT_SHIPPING_FEE, DEFAULT_FREE_SHIPPING_THRESHOLD, DEFAULT_TAX_RATE_BPS};

/// Store-wide pricing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Tax applied to the post-discount amount (GST, 18% by default).
    pub tax_rate: Rate,

    /// Subtotals strictly above this ship for free.
    pub free_shipping_threshold: Money,

    /// Shipping charged at or below the threshold.
    pub flat_shipping_fee: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            tax_rate: Rate::from_bps(DEFAULT_TAX_RATE_BPS),
            free_shipping_threshold: Money::from_major(DEFAULT_FREE_SHIPPING_THRESHOLD),
            flat_shipping_fee: Money::from_major(DEFAULT_FLAT_SHIPPING_FEE),
        }
    }
}

impl PricingPolicy {
    /// Checks the policy for out-of-range values.
    pub fn validate(&self) -> CoreResult<()> {
        validate_rate_bps("tax_rate", self.tax_rate.bps())?;
        validate_non_negative("free_shipping_threshold", self.free_shipping_threshold)?;
        validate_non_negative("flat_shipping_fee", self.flat_shipping_fee)?;
        Ok(())
    }

    /// Shipping fee for a given pre-discount subtotal.
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal > self.free_shipping_threshold {
            Money::zero()
        } else {
            self.flat_shipping_fee
        }
    }
}

/// Computes the order summary. Pure; recomputed on every change.
///
/// ## Example
/// ```rust
/// use shopfront_core::pricing::{compute_summary, PricingPolicy};
/// use shopfront_core::{Coupon, LineItem, Money, Rate};
///
/// let item = LineItem {
///     cart_entry_id: "row-1".into(),
///     product_id: "p-1".into(),
///     name: "Cap".into(),
///     category: None,
///     brand: None,
///     unit_price: Money::from_major(200),
///     original_price: None,
///     stock: 5,
///     quantity: 1,
///     size: None,
///     color: None,
///     image: String::new(),
/// };
/// let coupon = Coupon { code: "SAVE10".into(), discount_rate: Rate::from_percentage(10) };
///
/// let summary = compute_summary(&[item], Some(&coupon), &PricingPolicy::default());
/// assert_eq!(summary.total.to_string(), "262.40");
/// ```
pub fn compute_summary(
    items: &[LineItem],
    coupon: Option<&Coupon>,
    policy: &PricingPolicy,
) -> OrderSummary {
    let subtotal: Money = items.iter().map(LineItem::line_total).sum();

    let discount_amount = coupon
        .map(|c| subtotal.apply_rate(c.discount_rate))
        .unwrap_or_else(Money::zero);

    let tax_amount = (subtotal - discount_amount).apply_rate(policy.tax_rate);
    let shipping_fee = policy.shipping_for(subtotal);
    let total = subtotal - discount_amount + tax_amount + shipping_fee;

    OrderSummary {
        item_count: items.len(),
        total_quantity: items.iter().map(|i| i.quantity).sum(),
        subtotal,
        discount_amount,
        tax_amount,
        shipping_fee,
        total,
    }
}
