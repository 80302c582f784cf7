//! # Store Interfaces
//!
//! The two seams between the cart page and the hosted backend.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartView ──► Arc<dyn AuthProvider> ──► current_user()                 │
//! │      │                                                                  │
//! │      └──────► Arc<dyn CartStore>                                        │
//! │                 ├── fetch_cart_for_user(user_id)  → Vec<CartRecord>     │
//! │                 ├── update_quantity(entry_id, qty)                      │
//! │                 ├── delete_entry(entry_id)                              │
//! │                 └── insert_wishlist_entry(user_id, product_id)          │
//! │                                                                         │
//! │  Implementations: RestCartStore, InMemoryCartStore, RetryingStore<S>   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use shopfront_core::{CartRecord, User};

use crate::error::StoreResult;

/// Persistent storage for cart rows and wishlist entries.
///
/// Implementations must be safe to share across tasks; the view holds one
/// behind an `Arc`.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// All cart rows for a user, each with its product embedded.
    async fn fetch_cart_for_user(&self, user_id: &str) -> StoreResult<Vec<CartRecord>>;

    /// Overwrites the quantity on one cart row.
    async fn update_quantity(&self, entry_id: &str, quantity: i64) -> StoreResult<()>;

    /// Deletes one cart row.
    async fn delete_entry(&self, entry_id: &str) -> StoreResult<()>;

    /// Adds a product to the user's wishlist.
    async fn insert_wishlist_entry(&self, user_id: &str, product_id: &str) -> StoreResult<()>;
}

/// Resolves the signed-in shopper.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current user, or `None` when nobody is signed in.
    async fn current_user(&self) -> StoreResult<Option<User>>;
}

#[async_trait]
impl<T: CartStore + ?Sized> CartStore for Arc<T> {
    async fn fetch_cart_for_user(&self, user_id: &str) -> StoreResult<Vec<CartRecord>> {
        (**self).fetch_cart_for_user(user_id).await
    }

    async fn update_quantity(&self, entry_id: &str, quantity: i64) -> StoreResult<()> {
        (**self).update_quantity(entry_id, quantity).await
    }

    async fn delete_entry(&self, entry_id: &str) -> StoreResult<()> {
        (**self).delete_entry(entry_id).await
    }

    async fn insert_wishlist_entry(&self, user_id: &str, product_id: &str) -> StoreResult<()> {
        (**self).insert_wishlist_entry(user_id, product_id).await
    }
}

#[async_trait]
impl<T: AuthProvider + ?Sized> AuthProvider for Arc<T> {
    async fn current_user(&self) -> StoreResult<Option<User>> {
        (**self).current_user().await
    }
}
