//! # In-Memory Store
//!
//! A [`CartStore`] held entirely in process, plus a fixed [`AuthProvider`].
//!
//! Used by the preview binary for fixture files and by tests. Failures can be
//! queued per operation to exercise rollback and retry paths:
//!
//! ```text
//! store.fail_next(StoreOperation::UpdateQuantity, StoreError::Http(..))
//!      │
//!      ▼
//! next update_quantity() ──► pops the queued error, state untouched
//! following calls        ──► behave normally
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shopfront_core::{CartRecord, User};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::{AuthProvider, CartStore};

// =============================================================================
// Operations
// =============================================================================

/// Names a [`CartStore`] method, for failure injection and call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    FetchCart,
    UpdateQuantity,
    DeleteEntry,
    InsertWishlist,
}

impl StoreOperation {
    const ALL: [StoreOperation; 4] = [
        StoreOperation::FetchCart,
        StoreOperation::UpdateQuantity,
        StoreOperation::DeleteEntry,
        StoreOperation::InsertWishlist,
    ];

    fn index(self) -> usize {
        match self {
            StoreOperation::FetchCart => 0,
            StoreOperation::UpdateQuantity => 1,
            StoreOperation::DeleteEntry => 2,
            StoreOperation::InsertWishlist => 3,
        }
    }
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreOperation::FetchCart => write!(f, "fetch_cart"),
            StoreOperation::UpdateQuantity => write!(f, "update_quantity"),
            StoreOperation::DeleteEntry => write!(f, "delete_entry"),
            StoreOperation::InsertWishlist => write!(f, "insert_wishlist"),
        }
    }
}

/// A wishlist row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistEntry {
    pub product_id: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    user_id: String,
    record: CartRecord,
}

// =============================================================================
// InMemoryCartStore
// =============================================================================

/// Process-local cart store.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    /// Cart rows in insertion order.
    entries: RwLock<Vec<StoredEntry>>,

    /// Wishlist rows keyed by user id.
    wishlists: RwLock<HashMap<String, Vec<WishlistEntry>>>,

    /// Errors to return instead of running the next matching call.
    failures: Mutex<VecDeque<(StoreOperation, StoreError)>>,

    /// Artificial delay before every call.
    latency: Option<Duration>,

    calls: [AtomicUsize; 4],
}

impl InMemoryCartStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with cart rows for one user.
    pub fn with_entries(self, user_id: &str, records: Vec<CartRecord>) -> Self {
        let mut entries = self.entries.into_inner();
        entries.extend(records.into_iter().map(|record| StoredEntry {
            user_id: user_id.to_string(),
            record,
        }));
        InMemoryCartStore {
            entries: RwLock::new(entries),
            ..self
        }
    }

    /// Delays every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Builds a store from a JSON array of cart records owned by `user_id`.
    pub fn from_fixture_json(user_id: &str, json: &str) -> StoreResult<Self> {
        let records: Vec<CartRecord> = serde_json::from_str(json)?;
        debug!(user_id, count = records.len(), "Loaded cart fixture");
        Ok(Self::new().with_entries(user_id, records))
    }

    /// Queues an error for the next call to `operation`.
    pub async fn fail_next(&self, operation: StoreOperation, error: StoreError) {
        self.failures.lock().await.push_back((operation, error));
    }

    /// Number of times `operation` has been called, failed calls included.
    pub fn calls(&self, operation: StoreOperation) -> usize {
        self.calls[operation.index()].load(Ordering::SeqCst)
    }

    /// Total calls across all operations.
    pub fn total_calls(&self) -> usize {
        StoreOperation::ALL.iter().map(|op| self.calls(*op)).sum()
    }

    /// Current quantity on a cart row.
    pub async fn quantity_of(&self, entry_id: &str) -> Option<i64> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.record.entry_id == entry_id)
            .map(|e| e.record.quantity)
    }

    /// Number of cart rows across all users.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Product ids on a user's wishlist, oldest first.
    pub async fn wishlist_for(&self, user_id: &str) -> Vec<String> {
        self.wishlists
            .read()
            .await
            .get(user_id)
            .map(|list| list.iter().map(|w| w.product_id.clone()).collect())
            .unwrap_or_default()
    }

    /// Counts the call, waits out the latency, then pops a queued failure.
    async fn begin(&self, operation: StoreOperation) -> StoreResult<()> {
        self.calls[operation.index()].fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut failures = self.failures.lock().await;
        if let Some(pos) = failures.iter().position(|(op, _)| *op == operation) {
            if let Some((_, error)) = failures.remove(pos) {
                debug!(%operation, %error, "Injected store failure");
                return Err(error);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn fetch_cart_for_user(&self, user_id: &str) -> StoreResult<Vec<CartRecord>> {
        self.begin(StoreOperation::FetchCart).await?;

        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.record.clone())
            .collect())
    }

    async fn update_quantity(&self, entry_id: &str, quantity: i64) -> StoreResult<()> {
        self.begin(StoreOperation::UpdateQuantity).await?;

        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|e| e.record.entry_id == entry_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "cart entry",
                id: entry_id.to_string(),
            })?;
        entry.record.quantity = quantity;
        Ok(())
    }

    async fn delete_entry(&self, entry_id: &str) -> StoreResult<()> {
        self.begin(StoreOperation::DeleteEntry).await?;

        // Deleting a row that is already gone succeeds, as on the hosted backend
        self.entries
            .write()
            .await
            .retain(|e| e.record.entry_id != entry_id);
        Ok(())
    }

    async fn insert_wishlist_entry(&self, user_id: &str, product_id: &str) -> StoreResult<()> {
        self.begin(StoreOperation::InsertWishlist).await?;

        let mut wishlists = self.wishlists.write().await;
        let list = wishlists.entry(user_id.to_string()).or_default();
        if !list.iter().any(|w| w.product_id == product_id) {
            list.push(WishlistEntry {
                product_id: product_id.to_string(),
                added_at: Utc::now(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// StaticAuth
// =============================================================================

/// An [`AuthProvider`] that always reports the same user.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<User>,
}

impl StaticAuth {
    pub fn signed_in(user: User) -> Self {
        StaticAuth { user: Some(user) }
    }

    pub fn anonymous() -> Self {
        StaticAuth { user: None }
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn current_user(&self) -> StoreResult<Option<User>> {
        Ok(self.user.clone())
    }
}
