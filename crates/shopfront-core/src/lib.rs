//! # shopfront-core: Cart Pricing Engine
//!
//! This crate is the **heart** of the Shopfront cart page. It contains the
//! cart rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopfront Cart Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation layer                           │   │
//! │  │      Line items ──► Quantity controls ──► Summary ──► Checkout  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 cart-view (view state machine)                  │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────┐  ┌────────────▼────────────────────┐  │
//! │  │  shopfront-core (THIS)      │  │  shopfront-store                │  │
//! │  │  normalize, pricing,        │  │  hosted backend, auth,          │  │
//! │  │  coupons, quantity rules    │  │  retries                        │  │
//! │  │  NO I/O • PURE FUNCTIONS    │  │                                 │  │
//! │  └─────────────────────────────┘  └─────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Backend records, line items, coupon, order summary
//! - [`money`] - Exact decimal `Money` and basis-point `Rate`
//! - [`normalize`] - Backend record → line item
//! - [`pricing`] - Order summary computation
//! - [`coupon`] - Coupon lookup seam
//! - [`cart`] - Line-item set and quantity rules
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use shopfront_core::{Cart, LineItem, Money, PricingPolicy, StaticCouponBook};
//!
//! let mut cart = Cart::from_items(vec![LineItem {
//!     cart_entry_id: "row-1".into(),
//!     product_id: "p-1".into(),
//!     name: "Sneakers".into(),
//!     category: Some("Shoes".into()),
//!     brand: None,
//!     unit_price: Money::from_major(1000),
//!     original_price: None,
//!     stock: 4,
//!     quantity: 2,
//!     size: Some("42".into()),
//!     color: None,
//!     image: String::new(),
//! }]);
//!
//! let summary = cart.summary(&PricingPolicy::default());
//! assert_eq!(summary.total.to_string(), "2360.00");
//!
//! cart.apply_coupon("SAVE10", &StaticCouponBook::standard()).unwrap();
//! assert_eq!(cart.summary(&PricingPolicy::default()).discount_amount, Money::from_major(200));
//! ```

pub mod cart;
pub mod coupon;
pub mod error;
pub mod money;
pub mod normalize;
pub mod pricing;
pub mod types;
pub mod validation;

pub use cart::{Cart, CheckoutReadiness, QuantityChange, RemovedLine};
pub use coupon::{apply_coupon, CouponLookup, DiscountRule, StaticCouponBook};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use normalize::normalize;
pub use pricing::{compute_summary, PricingPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Image shown when a product has no image flagged main.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/150";

/// GST, in basis points (18%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1800;

/// Subtotals strictly above this ship for free.
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: i64 = 500;

/// Shipping charged at or below the free-shipping threshold.
pub const DEFAULT_FLAT_SHIPPING_FEE: i64 = 50;
