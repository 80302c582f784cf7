//! # Money Module
//!
//! Provides the `Money` type for monetary values and `Rate` for percentages.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │    (200 - 20) * 0.18 = 32.400000000000006  ❌                           │
//! │                                                                         │
//! │  The order summary is recomputed on every render, so drift shows up    │
//! │  as totals that flicker by a paisa between renders.                    │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    (200 - 20) * 1800 / 10000 = 32.4 exactly                             │
//! │    Intermediates keep full precision; only display rounds to 2 places  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopfront_core::money::{Money, Rate};
//!
//! let price = Money::from_major(200);
//! let discount = price.apply_rate(Rate::from_percentage(10));
//! assert_eq!(discount, Money::from_major(20));
//!
//! let tax = (price - discount).apply_rate(Rate::from_bps(1800));
//! assert_eq!(tax.to_string(), "32.40");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of decimal places shown to the shopper.
pub const DISPLAY_DECIMALS: u32 = 2;

const BPS_PER_UNIT: i64 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in major currency units (rupees, dollars).
///
/// ## Design Decisions
/// - **Decimal (not f64)**: the backend sends prices such as `199.99`; they
///   are parsed straight into a decimal so no binary rounding ever happens
/// - **Signed**: allows negative differences while computing totals
/// - **Transparent serde**: accepts JSON numbers or strings from the backend
///
/// ## Where Money is Used
/// ```text
/// ProductRecord.price ──┬──► LineItem.unit_price ──► line total
///                       │
///                       └──► LineItem.original_price (strikethrough)
///
/// Σ line totals ──► subtotal ──► discount ──► tax ──► total
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a Money value from a whole number of major units.
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(1000).to_string(), "1000.00");
    /// ```
    #[inline]
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// Creates a Money value from minor units (paise, cents).
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(19999).to_string(), "199.99");
    /// ```
    #[inline]
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, 2))
    }

    /// Returns the exact, unrounded amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// let line_total = Money::from_major(1000).multiply_quantity(2);
    /// assert_eq!(line_total, Money::from_major(2000));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Returns `rate` of this amount, exactly.
    ///
    /// Used for both the coupon discount and tax. No rounding happens here:
    /// `Money::from_major(180).apply_rate(18%)` is exactly `32.4`.
    pub fn apply_rate(&self, rate: Rate) -> Money {
        Money(self.0 * Decimal::from(rate.bps()) / Decimal::from(BPS_PER_UNIT))
    }

    /// Rounds to two decimal places (half away from zero) for display.
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// let amount: Money = "10.005".parse().unwrap();
    /// assert_eq!(amount.rounded().to_string(), "10.01");
    /// ```
    pub fn rounded(&self) -> Money {
        let mut value = self
            .0
            .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(DISPLAY_DECIMALS);
        Money(value)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount rounded to two places, without a currency symbol.
///
/// ## Note
/// The cart view adds the configured currency symbol when rendering.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rounded().0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (GST), 1000 bps = 10% (SAVE10)
///
/// Integer bps keep rates exact and comparable; the multiplication
/// happens in [`Money::apply_rate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage, saturating at `u32::MAX` bps.
    #[inline]
    pub const fn from_percentage(pct: u32) -> Self {
        Rate(pct.saturating_mul(100))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a decimal percentage (1800 bps → 18).
    pub fn percentage(&self) -> Decimal {
        Decimal::new(i64::from(self.0), 2)
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage().normalize())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_constructors() {
        assert_eq!(Money::from_major(10), money("10"));
        assert_eq!(Money::from_minor(1099), money("10.99"));
        assert_eq!(Money::from_major(10), Money::from_minor(1000));
    }

    #[test]
    fn test_display_rounds_to_two_places() {
        assert_eq!(Money::from_major(286).to_string(), "286.00");
        assert_eq!(money("262.4").to_string(), "262.40");
        assert_eq!(money("0.125").to_string(), "0.13");
        assert_eq!(money("-5.5").to_string(), "-5.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_major(1000);
        let b = Money::from_major(500);

        assert_eq!(a + b, Money::from_major(1500));
        assert_eq!(a - b, Money::from_major(500));
        assert_eq!(a * 3, Money::from_major(3000));

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total, Money::from_major(2000));
    }

    #[test]
    fn test_apply_rate_is_exact() {
        // Binary floats give 32.400000000000006 here
        let tax = Money::from_major(180).apply_rate(Rate::from_bps(1800));
        assert_eq!(tax, money("32.4"));

        let discount = money("199.99").apply_rate(Rate::from_percentage(10));
        assert_eq!(discount, money("19.999"));
        assert_eq!(discount.to_string(), "20.00");
    }

    #[test]
    fn test_zero_and_sign() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_negative());
        assert!(money("-0.01").is_negative());
        assert!(!Money::from_major(1).is_negative());
    }

    #[test]
    fn test_deserialize_from_number_and_string() {
        let from_number: Money = serde_json::from_str("199.99").unwrap();
        let from_string: Money = serde_json::from_str("\"199.99\"").unwrap();
        assert_eq!(from_number, money("199.99"));
        assert_eq!(from_string, money("199.99"));
    }

    #[test]
    fn test_rate() {
        let gst = Rate::from_bps(1800);
        assert_eq!(gst, Rate::from_percentage(18));
        assert_eq!(gst.to_string(), "18%");
        assert_eq!(Rate::from_bps(825).to_string(), "8.25%");
        assert!(Rate::default().is_zero());
        assert_eq!(Rate::from_percentage(u32::MAX).bps(), u32::MAX);
    }
}
