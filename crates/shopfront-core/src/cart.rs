//! # Cart
//!
//! The in-memory line-item set and the rules for changing it.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shopper Action          Cart Method              Effect                │
//! │  ──────────────          ───────────              ──────                │
//! │                                                                         │
//! │  Click +  ─────────────► increment() ───────────► qty + 1 (≤ stock)    │
//! │  Click −  ─────────────► decrement() ───────────► qty − 1 (≥ 1)        │
//! │  Type qty ─────────────► adjust_quantity() ─────► qty = n              │
//! │  Remove / Wishlist ────► remove_line_item() ────► items.remove(i)      │
//! │  Enter code ───────────► apply_coupon() ────────► coupon replaced      │
//! │  Render ───────────────► summary() ─────────────► recomputed totals    │
//! │                                                                         │
//! │  Invariant after every method: 1 <= quantity <= stock                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::coupon::{apply_coupon, CouponLookup};
use crate::error::{CoreError, CoreResult};
use crate::normalize::normalize_all;
use crate::pricing::{compute_summary, PricingPolicy};
use crate::types::{CartRecord, Coupon, LineItem, OrderSummary};

/// Outcome of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The request was a no-op (below 1, or already at that quantity).
    Unchanged,
    /// The quantity moved from `previous` to `current`.
    Updated { previous: i64, current: i64 },
}

/// A line item removed from the cart, with its position for rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedLine {
    pub index: usize,
    pub item: LineItem,
}

/// Whether the cart may proceed to checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutReadiness {
    Ready,
    Empty,
    /// These entries hold more than the stock allows.
    StockConflict(Vec<String>),
}

/// The shopper's cart: line items plus at most one coupon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
    coupon: Option<Coupon>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from already-normalized line items.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        Cart {
            items,
            coupon: None,
        }
    }

    /// Builds a cart from backend rows.
    pub fn from_records(records: &[CartRecord]) -> Self {
        Self::from_items(normalize_all(records))
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Looks up a line by cart entry id.
    pub fn find(&self, cart_entry_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.cart_entry_id == cart_entry_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    // =========================================================================
    // Quantity
    // =========================================================================

    /// Sets a line's quantity.
    ///
    /// ## Behavior
    /// - `new_quantity < 1`: no-op, returns `Unchanged`
    /// - `new_quantity > stock`: `StockExceeded`, cart untouched. This also
    ///   holds for a stale line already above stock: only a quantity within
    ///   stock is accepted
    /// - unknown entry: `LineItemNotFound`
    pub fn adjust_quantity(
        &mut self,
        cart_entry_id: &str,
        new_quantity: i64,
    ) -> CoreResult<QuantityChange> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.cart_entry_id == cart_entry_id)
            .ok_or_else(|| CoreError::LineItemNotFound(cart_entry_id.to_string()))?;

        if new_quantity < 1 || new_quantity == item.quantity {
            return Ok(QuantityChange::Unchanged);
        }

        if new_quantity > item.stock {
            return Err(CoreError::StockExceeded {
                name: item.name.clone(),
                available: item.stock,
                requested: new_quantity,
            });
        }

        let previous = item.quantity;
        item.quantity = new_quantity;
        Ok(QuantityChange::Updated {
            previous,
            current: new_quantity,
        })
    }

    /// Raises a line's quantity by one.
    pub fn increment(&mut self, cart_entry_id: &str) -> CoreResult<QuantityChange> {
        let current = self.quantity_of(cart_entry_id)?;
        self.adjust_quantity(cart_entry_id, current + 1)
    }

    /// Lowers a line's quantity by one; a no-op at 1.
    pub fn decrement(&mut self, cart_entry_id: &str) -> CoreResult<QuantityChange> {
        let current = self.quantity_of(cart_entry_id)?;
        self.adjust_quantity(cart_entry_id, current - 1)
    }

    /// Puts a line back to a quantity it held before, skipping the stock check.
    ///
    /// Used to roll back an optimistic change the backend rejected.
    pub fn restore_quantity(&mut self, cart_entry_id: &str, quantity: i64) -> CoreResult<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.cart_entry_id == cart_entry_id)
            .ok_or_else(|| CoreError::LineItemNotFound(cart_entry_id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    fn quantity_of(&self, cart_entry_id: &str) -> CoreResult<i64> {
        self.find(cart_entry_id)
            .map(|i| i.quantity)
            .ok_or_else(|| CoreError::LineItemNotFound(cart_entry_id.to_string()))
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes a line; `None` if no line has that id.
    pub fn remove_line_item(&mut self, cart_entry_id: &str) -> Option<RemovedLine> {
        let index = self
            .items
            .iter()
            .position(|i| i.cart_entry_id == cart_entry_id)?;
        let item = self.items.remove(index);
        Some(RemovedLine { index, item })
    }

    /// Re-inserts a removed line at its old position (clamped to the end).
    pub fn restore_line_item(&mut self, removed: RemovedLine) {
        let index = removed.index.min(self.items.len());
        self.items.insert(index, removed.item);
    }

    // =========================================================================
    // Coupon
    // =========================================================================

    /// Applies a coupon, replacing any previous one.
    ///
    /// A rejected code leaves the current coupon in place.
    pub fn apply_coupon(&mut self, code: &str, coupons: &dyn CouponLookup) -> CoreResult<&Coupon> {
        let coupon = apply_coupon(code, coupons)?;
        let applied = self.coupon.insert(coupon);
        Ok(&*applied)
    }

    /// Removes the applied coupon.
    pub fn clear_coupon(&mut self) -> Option<Coupon> {
        self.coupon.take()
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Recomputes the order summary.
    pub fn summary(&self, policy: &PricingPolicy) -> OrderSummary {
        compute_summary(&self.items, self.coupon.as_ref(), policy)
    }

    /// Checks whether the cart may proceed to checkout.
    pub fn checkout_readiness(&self) -> CheckoutReadiness {
        if self.items.is_empty() {
            return CheckoutReadiness::Empty;
        }

        let conflicts: Vec<String> = self
            .items
            .iter()
            .filter(|i| i.quantity < 1 || i.exceeds_stock())
            .map(|i| i.cart_entry_id.clone())
            .collect();

        if conflicts.is_empty() {
            CheckoutReadiness::Ready
        } else {
            CheckoutReadiness::StockConflict(conflicts)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::StaticCouponBook;
    use crate::money::{Money, Rate};

    fn item(id: &str, unit_price: i64, quantity: i64, stock: i64) -> LineItem {
        LineItem {
            cart_entry_id: id.to_string(),
            product_id: format!("product-{id}"),
            name: format!("Item {id}"),
            category: None,
            brand: None,
            unit_price: Money::from_major(unit_price),
            original_price: None,
            stock,
            quantity,
            size: None,
            color: None,
            image: String::new(),
        }
    }

    fn cart() -> Cart {
        Cart::from_items(vec![item("a", 200, 1, 3), item("b", 1000, 2, 2)])
    }

    #[test]
    fn test_adjust_below_one_is_noop() {
        let mut cart = cart();
        let before = cart.clone();

        assert_eq!(cart.adjust_quantity("a", 0).unwrap(), QuantityChange::Unchanged);
        assert_eq!(cart.adjust_quantity("a", -4).unwrap(), QuantityChange::Unchanged);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_adjust_within_stock() {
        let mut cart = cart();
        let change = cart.adjust_quantity("a", 3).unwrap();
        assert_eq!(
            change,
            QuantityChange::Updated {
                previous: 1,
                current: 3
            }
        );
        assert_eq!(cart.find("a").unwrap().quantity, 3);
    }

    #[test]
    fn test_adjust_above_stock_rejected() {
        let mut cart = cart();
        let err = cart.adjust_quantity("a", 4).unwrap_err();
        assert!(matches!(
            err,
            CoreError::StockExceeded {
                available: 3,
                requested: 4,
                ..
            }
        ));
        assert_eq!(cart.find("a").unwrap().quantity, 1);
    }

    #[test]
    fn test_adjust_unknown_entry() {
        let mut cart = cart();
        assert!(matches!(
            cart.adjust_quantity("zzz", 2),
            Err(CoreError::LineItemNotFound(_))
        ));
    }

    #[test]
    fn test_increment_and_decrement_bounds() {
        let mut cart = cart();

        // "b" is already at stock
        assert!(cart.increment("b").is_err());
        assert_eq!(cart.find("b").unwrap().quantity, 2);

        // "a" is at 1
        assert_eq!(cart.decrement("a").unwrap(), QuantityChange::Unchanged);
        assert_eq!(cart.find("a").unwrap().quantity, 1);

        cart.increment("a").unwrap();
        cart.increment("a").unwrap();
        assert_eq!(cart.find("a").unwrap().quantity, 3);
        assert!(cart.increment("a").is_err());
    }

    #[test]
    fn test_remove_and_restore_keeps_position() {
        let mut cart = Cart::from_items(vec![
            item("a", 1, 1, 1),
            item("b", 1, 1, 1),
            item("c", 1, 1, 1),
        ]);

        let removed = cart.remove_line_item("b").unwrap();
        assert_eq!(removed.index, 1);
        assert_eq!(cart.item_count(), 2);

        cart.restore_line_item(removed);
        let ids: Vec<&str> = cart.items().iter().map(|i| i.cart_entry_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut cart = cart();
        assert!(cart.remove_line_item("missing").is_none());
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_coupon_replaces_and_clears() {
        let book = StaticCouponBook::standard()
            .with("HALF", crate::coupon::DiscountRule::percent_off(50))
            .unwrap();
        let mut cart = cart();

        cart.apply_coupon("SAVE10", &book).unwrap();
        cart.apply_coupon("HALF", &book).unwrap();
        assert_eq!(cart.coupon().unwrap().discount_rate, Rate::from_percentage(50));

        // A bad code keeps the current coupon
        assert!(cart.apply_coupon("NOPE", &book).is_err());
        assert_eq!(cart.coupon().unwrap().code, "HALF");

        assert!(cart.clear_coupon().is_some());
        assert!(cart.coupon().is_none());
    }

    #[test]
    fn test_summary_follows_mutations() {
        let policy = PricingPolicy::default();
        let mut cart = cart();
        // 200 + 2000
        assert_eq!(cart.summary(&policy).subtotal, Money::from_major(2200));

        cart.remove_line_item("b");
        let summary = cart.summary(&policy);
        assert_eq!(summary.subtotal, Money::from_major(200));
        assert_eq!(summary.total, Money::from_major(286));
    }

    #[test]
    fn test_checkout_readiness() {
        assert_eq!(Cart::new().checkout_readiness(), CheckoutReadiness::Empty);
        assert_eq!(cart().checkout_readiness(), CheckoutReadiness::Ready);

        let stale = Cart::from_items(vec![item("a", 1, 5, 2), item("b", 1, 1, 1)]);
        assert_eq!(
            stale.checkout_readiness(),
            CheckoutReadiness::StockConflict(vec!["a".to_string()])
        );
    }

    #[test]
    fn test_stale_line_only_accepts_quantity_within_stock() {
        let mut cart = Cart::from_items(vec![item("a", 1, 5, 2)]);

        // Lowering to a value still above stock is rejected
        assert!(matches!(
            cart.adjust_quantity("a", 4),
            Err(CoreError::StockExceeded {
                available: 2,
                requested: 4,
                ..
            })
        ));
        assert!(cart.decrement("a").is_err());
        assert_eq!(cart.find("a").unwrap().quantity, 5);

        cart.adjust_quantity("a", 2).unwrap();
        assert_eq!(cart.checkout_readiness(), CheckoutReadiness::Ready);
    }

    #[test]
    fn test_restore_quantity_skips_stock_check() {
        let mut cart = Cart::from_items(vec![item("a", 1, 5, 2)]);
        cart.adjust_quantity("a", 2).unwrap();
        cart.restore_quantity("a", 5).unwrap();
        assert_eq!(cart.find("a").unwrap().quantity, 5);
    }
}
