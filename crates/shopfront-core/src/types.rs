//! # Domain Types
//!
//! Core types used throughout the cart page.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Backend shape (raw)              View shape (canonical)                │
//! │  ┌─────────────────┐              ┌─────────────────┐                  │
//! │  │   CartRecord    │  normalize   │    LineItem     │                  │
//! │  │  ─────────────  │ ───────────► │  ─────────────  │                  │
//! │  │  entry_id       │              │  cart_entry_id  │                  │
//! │  │  quantity       │              │  unit_price     │                  │
//! │  │  product ──┐    │              │  original_price │                  │
//! │  └────────────┼────┘              │  quantity/stock │                  │
//! │               ▼                   │  image          │                  │
//! │  ┌─────────────────┐              └────────┬────────┘                  │
//! │  │  ProductRecord  │                       │ compute_summary           │
//! │  │  price          │                       ▼                           │
//! │  │  discount_price │              ┌─────────────────┐  ┌────────────┐ │
//! │  │  images[]       │              │  OrderSummary   │◄─│   Coupon   │ │
//! │  └─────────────────┘              └─────────────────┘  └────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! A line item carries two identifiers:
//! - `cart_entry_id`: the cart row, used for every mutation
//! - `product_id`: the catalog product, used for the wishlist

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Rate};

// =============================================================================
// Raw Backend Records
// =============================================================================

/// One cart row as returned by the hosted backend, with its product embedded.
///
/// Field names follow the backend's camelCase JSON; the snake_case column
/// names of the underlying tables are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    /// Cart row identifier.
    #[serde(alias = "id", alias = "entry_id")]
    pub entry_id: String,

    /// Quantity stored on the cart row.
    pub quantity: i64,

    /// Selected size variant.
    #[serde(default)]
    pub size: Option<String>,

    /// Selected color variant.
    #[serde(default)]
    pub color: Option<String>,

    /// When the row was created.
    #[serde(default, alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,

    /// The embedded product.
    #[serde(alias = "products")]
    pub product: ProductRecord,
}

/// Catalog product embedded in a cart row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub category: Option<String>,

    /// List price.
    pub price: Money,

    /// Sale price, when a discount is active.
    #[serde(default, alias = "discount_price")]
    pub discount_price: Option<Money>,

    /// Units available at fetch time. Missing stock means nothing can be bought.
    #[serde(default)]
    pub stock: Option<i64>,

    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default, alias = "product_images")]
    pub images: Vec<ProductImage>,
}

/// A product image; at most one is expected to be flagged main.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    #[serde(alias = "image_url")]
    pub url: String,

    #[serde(default, alias = "is_main")]
    pub is_main: bool,
}

// =============================================================================
// Line Item
// =============================================================================

/// One product + variant + quantity entry in the cart, in canonical shape.
///
/// ## Invariant
/// `1 <= quantity <= stock` after every mutation made through [`crate::Cart`].
/// Rows fetched from the backend are taken as-is; see [`LineItem::exceeds_stock`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Cart row identifier (not the product id).
    pub cart_entry_id: String,

    pub product_id: String,

    pub name: String,

    pub category: Option<String>,

    pub brand: Option<String>,

    /// Effective price: the discount price when present, else the list price.
    #[ts(type = "string")]
    pub unit_price: Money,

    /// List price, only set while a discount is active (strikethrough display).
    #[ts(type = "string | null")]
    pub original_price: Option<Money>,

    /// Maximum purchasable quantity at fetch time.
    pub stock: i64,

    pub quantity: i64,

    pub size: Option<String>,

    pub color: Option<String>,

    /// Display URL; the placeholder when the product has no main image.
    pub image: String,
}

impl LineItem {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Whether the increment affordance should be enabled.
    #[inline]
    pub fn can_increment(&self) -> bool {
        self.quantity < self.stock
    }

    /// True when the fetched quantity no longer fits the stock.
    ///
    /// Stock may drop between the shopper adding the item and loading the
    /// cart; such lines block checkout until the quantity is lowered to fit.
    #[inline]
    pub fn exceeds_stock(&self) -> bool {
        self.quantity > self.stock
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// An applied coupon. At most one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// The code as entered (trimmed).
    pub code: String,

    /// Percentage taken off the subtotal.
    pub discount_rate: Rate,
}

// =============================================================================
// Order Summary
// =============================================================================

/// Totals derived from the line items and coupon. Never stored or patched;
/// always recomputed from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// Number of distinct line items.
    pub item_count: usize,

    /// Sum of quantities across line items.
    pub total_quantity: i64,

    /// Σ unit price × quantity, before discount and tax.
    #[ts(type = "string")]
    pub subtotal: Money,

    #[ts(type = "string")]
    pub discount_amount: Money,

    /// Tax on the post-discount amount.
    #[ts(type = "string")]
    pub tax_amount: Money,

    /// Zero above the free-shipping threshold (pre-discount subtotal).
    #[ts(type = "string")]
    pub shipping_fee: Money,

    #[ts(type = "string")]
    pub total: Money,
}

impl OrderSummary {
    /// Whether free shipping applies.
    #[inline]
    pub fn has_free_shipping(&self) -> bool {
        self.shipping_fee.is_zero()
    }
}

// =============================================================================
// User
// =============================================================================

/// The signed-in shopper, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// Creates a user with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        User {
            id: id.into(),
            email: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i64, stock: i64) -> LineItem {
        LineItem {
            cart_entry_id: "entry-1".to_string(),
            product_id: "product-1".to_string(),
            name: "Linen Shirt".to_string(),
            category: Some("Shirts".to_string()),
            brand: None,
            unit_price: Money::from_major(799),
            original_price: None,
            stock,
            quantity,
            size: Some("M".to_string()),
            color: None,
            image: "https://cdn.example.com/shirt.jpg".to_string(),
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line(3, 10).line_total(), Money::from_major(2397));
    }

    #[test]
    fn test_quantity_affordances() {
        let at_one = line(1, 5);
        assert!(at_one.can_increment());

        let at_stock = line(5, 5);
        assert!(!at_stock.can_increment());
        assert!(!at_stock.exceeds_stock());

        assert!(line(6, 5).exceeds_stock());
    }

    #[test]
    fn test_cart_record_accepts_snake_case_columns() {
        let json = r#"{
            "id": "row-9",
            "quantity": 2,
            "size": "L",
            "color": null,
            "created_at": "2024-03-01T10:00:00Z",
            "products": {
                "id": "p-1",
                "name": "Denim Jacket",
                "category": "Jackets",
                "price": 2499,
                "discount_price": 1999.5,
                "stock": 4,
                "brand": "Acme",
                "product_images": [{ "image_url": "https://cdn.example.com/j.jpg", "is_main": true }]
            }
        }"#;

        let record: CartRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.entry_id, "row-9");
        assert!(record.created_at.is_some());
        assert_eq!(record.product.discount_price, Some("1999.5".parse().unwrap()));
        assert!(record.product.images[0].is_main);
    }

    #[test]
    fn test_cart_record_accepts_camel_case() {
        let json = r#"{
            "entryId": "row-1",
            "quantity": 1,
            "product": { "id": "p-2", "name": "Cap", "price": "200", "discountPrice": null }
        }"#;

        let record: CartRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.entry_id, "row-1");
        assert_eq!(record.product.discount_price, None);
        assert!(record.product.images.is_empty());
        assert_eq!(record.product.stock, None);
    }
}
