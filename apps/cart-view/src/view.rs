//! # Cart View
//!
//! The state machine behind the cart page.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │                 ┌───────────┐                                           │
//! │   new() ──────► │  Loading  │ ◄──────────── reload() ─────────┐        │
//! │                 └─────┬─────┘                                  │        │
//! │         ┌─────────────┼──────────────────┐                     │        │
//! │    no user       cart fetched        fetch/auth error          │        │
//! │         ▼             ▼                  ▼                     │        │
//! │  ┌───────────┐  ┌───────────┐      ┌───────────┐               │        │
//! │  │ Anonymous │  │   Ready   │      │  Failed   │ ──────────────┤        │
//! │  └───────────┘  └─────┬─────┘      └───────────┘               │        │
//! │                       │  set_quantity / increment / decrement  │        │
//! │                       │  remove / move_to_wishlist             │        │
//! │                       │  apply_coupon / clear_coupon           │        │
//! │                       └────────────────────────────────────────┘        │
//! │                                                                         │
//! │  Ready with zero items is an empty cart. Failed is a load error and    │
//! │  is never shown as an empty cart.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Optimistic Writes
//! Every remote write is applied to the local cart first, then sent to the
//! store. A failed write puts the previous quantity or line back, leaves an
//! error [`Notice`], and returns `MUTATION_FAILED`.

use std::sync::Arc;

use serde::Serialize;
use shopfront_core::{
    Cart, CheckoutReadiness, CoreError, Coupon, CouponLookup, LineItem, OrderSummary,
    PricingPolicy, QuantityChange, User,
};
use shopfront_store::{AuthProvider, CartStore};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::{ApiError, Notice};

// =============================================================================
// View State
// =============================================================================

/// Where the cart page is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Resolving the user and fetching the cart.
    Loading,

    /// Nobody is signed in.
    Anonymous,

    /// Cart fetched; may be empty.
    Ready { user: User, cart: Cart },

    /// Loading failed; `reload` may succeed if the error is retryable.
    Failed { error: ApiError },
}

impl ViewState {
    pub fn status(&self) -> ViewStatus {
        match self {
            ViewState::Loading => ViewStatus::Loading,
            ViewState::Anonymous => ViewStatus::Anonymous,
            ViewState::Ready { .. } => ViewStatus::Ready,
            ViewState::Failed { .. } => ViewStatus::Failed,
        }
    }
}

/// Serializable tag for [`ViewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ViewStatus {
    Loading,
    Anonymous,
    Ready,
    Failed,
}

impl std::fmt::Display for ViewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewStatus::Loading => write!(f, "loading"),
            ViewStatus::Anonymous => write!(f, "anonymous"),
            ViewStatus::Ready => write!(f, "ready"),
            ViewStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Everything the presentation layer needs to draw the page.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub status: ViewStatus,

    pub items: Vec<LineItem>,

    pub coupon: Option<Coupon>,

    /// `None` unless the cart is ready and non-empty.
    pub totals: Option<OrderSummary>,

    pub checkout_ready: bool,

    /// Entries whose quantity exceeds the current stock.
    pub stock_conflicts: Vec<String>,

    pub notice: Option<Notice>,

    /// Set in the failed state.
    pub error: Option<ApiError>,
}

// =============================================================================
// CartView
// =============================================================================

/// Cart page controller.
///
/// Holds the store, auth and coupon book as explicit dependencies; drives
/// one shopper action at a time.
pub struct CartView {
    store: Arc<dyn CartStore>,
    auth: Arc<dyn AuthProvider>,
    coupons: Arc<dyn CouponLookup>,
    policy: PricingPolicy,
    state: ViewState,
    notice: Option<Notice>,
    /// Applied coupon, kept across reloads even when one fails.
    coupon_code: Option<String>,
}

impl CartView {
    /// Creates a view in the `Loading` state. Call [`load`](Self::load) next.
    pub fn new(
        store: Arc<dyn CartStore>,
        auth: Arc<dyn AuthProvider>,
        coupons: Arc<dyn CouponLookup>,
        policy: PricingPolicy,
    ) -> Self {
        CartView {
            store,
            auth,
            coupons,
            policy,
            state: ViewState::Loading,
            notice: None,
            coupon_code: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn status(&self) -> ViewStatus {
        self.state.status()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// The cart, when ready.
    pub fn cart(&self) -> Option<&Cart> {
        match &self.state {
            ViewState::Ready { cart, .. } => Some(cart),
            _ => None,
        }
    }

    /// Current totals; `None` unless ready with at least one line.
    pub fn summary(&self) -> Option<OrderSummary> {
        self.cart()
            .filter(|cart| !cart.is_empty())
            .map(|cart| cart.summary(&self.policy))
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Resolves the user and fetches the cart.
    pub async fn load(&mut self) -> ViewStatus {
        self.state = ViewState::Loading;

        let user = match self.auth.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => {
                info!("No signed-in user, showing anonymous cart");
                self.state = ViewState::Anonymous;
                return self.status();
            }
            Err(err) => {
                warn!(error = %err, "Failed to resolve current user");
                self.state = ViewState::Failed {
                    error: ApiError::fetch_failed(&err),
                };
                return self.status();
            }
        };

        match self.store.fetch_cart_for_user(&user.id).await {
            Ok(records) => {
                let mut cart = Cart::from_records(&records);
                if let Some(code) = &self.coupon_code {
                    if let Err(err) = cart.apply_coupon(code, self.coupons.as_ref()) {
                        debug!(code = %code, error = %err, "Dropping coupon on reload");
                        self.coupon_code = None;
                    }
                }

                info!(
                    user_id = %user.id,
                    items = cart.item_count(),
                    quantity = cart.total_quantity(),
                    "Cart loaded"
                );
                self.state = ViewState::Ready { user, cart };
            }
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "Failed to fetch cart");
                self.state = ViewState::Failed {
                    error: ApiError::fetch_failed(&err),
                };
            }
        }

        self.status()
    }

    /// Loads again from scratch. Allowed from every state.
    pub async fn reload(&mut self) -> ViewStatus {
        self.notice = None;
        self.load().await
    }

    // =========================================================================
    // Quantity
    // =========================================================================

    /// Sets a line's quantity and persists it.
    ///
    /// Quantities below 1 are ignored. Quantities above stock are rejected
    /// before anything is sent.
    pub async fn set_quantity(
        &mut self,
        cart_entry_id: &str,
        quantity: i64,
    ) -> Result<QuantityChange, ApiError> {
        let (_, cart) = ready_mut(&mut self.state, "change quantity")?;

        let change = match cart.adjust_quantity(cart_entry_id, quantity) {
            Ok(change) => change,
            Err(err) => return Err(self.fail(err.into())),
        };

        let QuantityChange::Updated { previous, current } = change else {
            return Ok(change);
        };

        match self.store.update_quantity(cart_entry_id, current).await {
            Ok(()) => {
                debug!(cart_entry_id, previous, current, "Quantity persisted");
                self.notice = Some(Notice::info("Quantity updated"));
                Ok(change)
            }
            Err(err) => {
                warn!(cart_entry_id, previous, error = %err, "Quantity update failed, rolling back");
                if let Err(rollback) = cart.restore_quantity(cart_entry_id, previous) {
                    warn!(error = %rollback, "Rollback target vanished");
                }
                Err(self.fail(ApiError::mutation_failed("update quantity", &err)))
            }
        }
    }

    /// Adds one to a line.
    pub async fn increment(&mut self, cart_entry_id: &str) -> Result<QuantityChange, ApiError> {
        let current = self.current_quantity(cart_entry_id, "change quantity")?;
        self.set_quantity(cart_entry_id, current + 1).await
    }

    /// Takes one off a line; a no-op at 1.
    pub async fn decrement(&mut self, cart_entry_id: &str) -> Result<QuantityChange, ApiError> {
        let current = self.current_quantity(cart_entry_id, "change quantity")?;
        self.set_quantity(cart_entry_id, current - 1).await
    }

    fn current_quantity(&mut self, cart_entry_id: &str, operation: &str) -> Result<i64, ApiError> {
        let lookup = ready_mut(&mut self.state, operation).and_then(|(_, cart)| {
            cart.find(cart_entry_id)
                .map(|item| item.quantity)
                .ok_or_else(|| CoreError::LineItemNotFound(cart_entry_id.to_string()).into())
        });
        lookup.map_err(|err| self.fail(err))
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes a line and deletes its cart row.
    pub async fn remove(&mut self, cart_entry_id: &str) -> Result<LineItem, ApiError> {
        let (_, cart) = ready_mut(&mut self.state, "remove item")?;

        let Some(removed) = cart.remove_line_item(cart_entry_id) else {
            let err = CoreError::LineItemNotFound(cart_entry_id.to_string()).into();
            return Err(self.fail(err));
        };

        match self.store.delete_entry(cart_entry_id).await {
            Ok(()) => {
                info!(cart_entry_id, product_id = %removed.item.product_id, "Removed from cart");
                self.notice = Some(Notice::info(format!("Removed {}", removed.item.name)));
                Ok(removed.item)
            }
            Err(err) => {
                warn!(cart_entry_id, error = %err, "Delete failed, restoring line");
                cart.restore_line_item(removed);
                Err(self.fail(ApiError::mutation_failed("remove item", &err)))
            }
        }
    }

    /// Adds the line's product to the wishlist, then removes the line.
    pub async fn move_to_wishlist(&mut self, cart_entry_id: &str) -> Result<LineItem, ApiError> {
        let (user, cart) = ready_mut(&mut self.state, "move to wishlist")?;

        let Some(removed) = cart.remove_line_item(cart_entry_id) else {
            let err = CoreError::LineItemNotFound(cart_entry_id.to_string()).into();
            return Err(self.fail(err));
        };

        let result = match self
            .store
            .insert_wishlist_entry(&user.id, &removed.item.product_id)
            .await
        {
            Ok(()) => self.store.delete_entry(cart_entry_id).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                info!(
                    cart_entry_id,
                    product_id = %removed.item.product_id,
                    "Moved to wishlist"
                );
                self.notice = Some(Notice::info(format!(
                    "Moved {} to your wishlist",
                    removed.item.name
                )));
                Ok(removed.item)
            }
            Err(err) => {
                warn!(cart_entry_id, error = %err, "Wishlist move failed, restoring line");
                cart.restore_line_item(removed);
                Err(self.fail(ApiError::mutation_failed("move item to wishlist", &err)))
            }
        }
    }

    // =========================================================================
    // Coupon
    // =========================================================================

    /// Applies a coupon code locally. A rejected code keeps the current coupon.
    pub fn apply_coupon(&mut self, code: &str) -> Result<Coupon, ApiError> {
        let (_, cart) = ready_mut(&mut self.state, "apply coupon")?;

        match cart.apply_coupon(code, self.coupons.as_ref()).cloned() {
            Ok(coupon) => {
                debug!(code = %coupon.code, rate = %coupon.discount_rate, "Coupon applied");
                self.coupon_code = Some(coupon.code.clone());
                self.notice = Some(Notice::info(format!(
                    "Coupon {} applied: {} off",
                    coupon.code, coupon.discount_rate
                )));
                Ok(coupon)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Removes the applied coupon, if any.
    pub fn clear_coupon(&mut self) -> Result<Option<Coupon>, ApiError> {
        let (_, cart) = ready_mut(&mut self.state, "clear coupon")?;
        let cleared = cart.clear_coupon();
        self.coupon_code = None;
        if let Some(coupon) = &cleared {
            self.notice = Some(Notice::info(format!("Coupon {} removed", coupon.code)));
        }
        Ok(cleared)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Snapshot for the presentation layer.
    pub fn response(&self) -> CartResponse {
        let (items, coupon, checkout) = match self.cart() {
            Some(cart) => (
                cart.items().to_vec(),
                cart.coupon().cloned(),
                cart.checkout_readiness(),
            ),
            None => (Vec::new(), None, CheckoutReadiness::Empty),
        };

        let (checkout_ready, stock_conflicts) = match checkout {
            CheckoutReadiness::Ready => (true, Vec::new()),
            CheckoutReadiness::Empty => (false, Vec::new()),
            CheckoutReadiness::StockConflict(ids) => (false, ids),
        };

        let error = match &self.state {
            ViewState::Failed { error } => Some(error.clone()),
            _ => None,
        };

        CartResponse {
            status: self.status(),
            items,
            coupon,
            totals: self.summary(),
            checkout_ready,
            stock_conflicts,
            notice: self.notice.clone(),
            error,
        }
    }

    /// Records an error notice and hands the error back.
    fn fail(&mut self, err: ApiError) -> ApiError {
        self.notice = Some(Notice::from(&err));
        err
    }
}

/// Borrows the user and cart, or explains why the operation is not allowed.
fn ready_mut<'a>(
    state: &'a mut ViewState,
    operation: &str,
) -> Result<(&'a User, &'a mut Cart), ApiError> {
    match state {
        ViewState::Ready { user, cart } => Ok((&*user, cart)),
        other => Err(CoreError::InvalidState {
            operation: operation.to_string(),
            state: other.status().to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use shopfront_core::{CartRecord, Money, ProductImage, ProductRecord, StaticCouponBook};
    use shopfront_store::{InMemoryCartStore, StaticAuth, StoreError, StoreOperation};

    const USER: &str = "user-1";

    fn record(entry_id: &str, product_id: &str, price: i64, quantity: i64, stock: i64) -> CartRecord {
        CartRecord {
            entry_id: entry_id.to_string(),
            quantity,
            size: Some("M".to_string()),
            color: None,
            created_at: None,
            product: ProductRecord {
                id: product_id.to_string(),
                name: format!("Product {product_id}"),
                category: None,
                price: Money::from_major(price),
                discount_price: None,
                stock: Some(stock),
                brand: None,
                images: vec![ProductImage {
                    url: format!("https://cdn.example.com/{product_id}.jpg"),
                    is_main: true,
                }],
            },
        }
    }

    fn seeded_store() -> Arc<InMemoryCartStore> {
        Arc::new(InMemoryCartStore::new().with_entries(
            USER,
            vec![
                record("e-1", "p-1", 1000, 2, 5),
                record("e-2", "p-2", 200, 1, 1),
            ],
        ))
    }

    fn view_with(store: Arc<InMemoryCartStore>, auth: StaticAuth) -> CartView {
        CartView::new(
            store,
            Arc::new(auth),
            Arc::new(StaticCouponBook::standard()),
            PricingPolicy::default(),
        )
    }

    async fn ready_view(store: Arc<InMemoryCartStore>) -> CartView {
        let mut view = view_with(store, StaticAuth::signed_in(User::new(USER)));
        assert_eq!(view.load().await, ViewStatus::Ready);
        view
    }

    #[tokio::test]
    async fn test_load_ready() {
        let view = ready_view(seeded_store()).await;
        let response = view.response();

        assert_eq!(response.status, ViewStatus::Ready);
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].image, "https://cdn.example.com/p-1.jpg");
        assert!(response.checkout_ready);

        // 2000 + 200 = 2200, tax 396, free shipping
        let totals = response.totals.unwrap();
        assert_eq!(totals.subtotal, Money::from_major(2200));
        assert_eq!(totals.total, Money::from_major(2596));
    }

    #[tokio::test]
    async fn test_load_anonymous() {
        let mut view = view_with(seeded_store(), StaticAuth::anonymous());
        assert_eq!(view.load().await, ViewStatus::Anonymous);
        assert!(view.response().totals.is_none());
    }

    #[tokio::test]
    async fn test_empty_cart_has_no_totals() {
        let mut view = view_with(
            Arc::new(InMemoryCartStore::new()),
            StaticAuth::signed_in(User::new(USER)),
        );
        assert_eq!(view.load().await, ViewStatus::Ready);

        let response = view.response();
        assert!(response.items.is_empty());
        assert!(response.totals.is_none());
        assert!(!response.checkout_ready);
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_an_empty_cart() {
        let store = seeded_store();
        store
            .fail_next(StoreOperation::FetchCart, StoreError::Http("reset".into()))
            .await;

        let mut view = view_with(store, StaticAuth::signed_in(User::new(USER)));
        assert_eq!(view.load().await, ViewStatus::Failed);

        let response = view.response();
        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::FetchFailed);
        assert!(error.retryable);
        assert!(response.totals.is_none());

        // The queued failure is spent, so a reload succeeds
        assert_eq!(view.reload().await, ViewStatus::Ready);
        assert_eq!(view.response().items.len(), 2);
    }

    #[tokio::test]
    async fn test_mutations_rejected_outside_ready() {
        let mut view = view_with(seeded_store(), StaticAuth::anonymous());
        view.load().await;

        let err = view.set_quantity("e-1", 3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(view.apply_coupon("SAVE10").is_err());
        assert!(view.remove("e-1").await.is_err());
    }

    #[tokio::test]
    async fn test_set_quantity_persists() {
        let store = seeded_store();
        let mut view = ready_view(store.clone()).await;

        let change = view.set_quantity("e-1", 4).await.unwrap();
        assert_eq!(change, QuantityChange::Updated { previous: 2, current: 4 });
        assert_eq!(store.quantity_of("e-1").await, Some(4));
        assert!(!view.notice().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_set_quantity_below_one_sends_nothing() {
        let store = seeded_store();
        let mut view = ready_view(store.clone()).await;

        assert_eq!(view.set_quantity("e-1", 0).await.unwrap(), QuantityChange::Unchanged);
        assert_eq!(view.decrement("e-2").await.unwrap(), QuantityChange::Unchanged);
        assert_eq!(store.calls(StoreOperation::UpdateQuantity), 0);
        assert_eq!(view.cart().unwrap().find("e-1").unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_stock_exceeded_sends_nothing() {
        let store = seeded_store();
        let mut view = ready_view(store.clone()).await;

        let err = view.increment("e-2").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StockExceeded);
        assert_eq!(view.notice().unwrap().code, Some(ErrorCode::StockExceeded));
        assert_eq!(store.calls(StoreOperation::UpdateQuantity), 0);
    }

    #[tokio::test]
    async fn test_failed_quantity_update_rolls_back() {
        let store = seeded_store();
        let mut view = ready_view(store.clone()).await;
        store
            .fail_next(StoreOperation::UpdateQuantity, StoreError::Timeout(std::time::Duration::from_secs(10)))
            .await;

        let err = view.increment("e-1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MutationFailed);
        assert!(err.retryable);

        assert_eq!(view.cart().unwrap().find("e-1").unwrap().quantity, 2);
        assert_eq!(store.quantity_of("e-1").await, Some(2));
        let notice = view.notice().unwrap();
        assert!(notice.is_error());
        assert!(notice.retryable);

        view.dismiss_notice();
        assert!(view.notice().is_none());
    }

    #[tokio::test]
    async fn test_remove_and_rollback() {
        let store = seeded_store();
        let mut view = ready_view(store.clone()).await;

        store
            .fail_next(StoreOperation::DeleteEntry, StoreError::Unavailable("maintenance".into()))
            .await;
        assert!(view.remove("e-1").await.is_err());
        let ids: Vec<String> = view.response().items.into_iter().map(|i| i.cart_entry_id).collect();
        assert_eq!(ids, vec!["e-1", "e-2"]);

        let removed = view.remove("e-1").await.unwrap();
        assert_eq!(removed.product_id, "p-1");
        assert_eq!(view.cart().unwrap().item_count(), 1);
        assert_eq!(store.entry_count().await, 1);

        let err = view.remove("e-1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_move_to_wishlist() {
        let store = seeded_store();
        let mut view = ready_view(store.clone()).await;

        view.move_to_wishlist("e-2").await.unwrap();
        assert_eq!(store.wishlist_for(USER).await, vec!["p-2"]);
        assert_eq!(store.quantity_of("e-2").await, None);
        assert!(view.cart().unwrap().find("e-2").is_none());
    }

    #[tokio::test]
    async fn test_move_to_wishlist_rolls_back_when_delete_fails() {
        let store = seeded_store();
        let mut view = ready_view(store.clone()).await;
        store
            .fail_next(StoreOperation::DeleteEntry, StoreError::Http("reset".into()))
            .await;

        let err = view.move_to_wishlist("e-2").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MutationFailed);
        assert!(view.cart().unwrap().find("e-2").is_some());
        assert_eq!(store.quantity_of("e-2").await, Some(1));
    }

    #[tokio::test]
    async fn test_move_to_wishlist_rolls_back_when_insert_fails() {
        let store = seeded_store();
        let mut view = ready_view(store.clone()).await;
        store
            .fail_next(StoreOperation::InsertWishlist, StoreError::Http("reset".into()))
            .await;

        assert!(view.move_to_wishlist("e-1").await.is_err());
        assert_eq!(store.calls(StoreOperation::DeleteEntry), 0);
        assert_eq!(view.cart().unwrap().items()[0].cart_entry_id, "e-1");
    }

    #[tokio::test]
    async fn test_coupon_flow() {
        let mut view = ready_view(Arc::new(InMemoryCartStore::new().with_entries(
            USER,
            vec![record("e-1", "p-1", 200, 1, 3)],
        )))
        .await;

        let err = view.apply_coupon("SAVE50").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoupon);
        assert_eq!(view.summary().unwrap().total, Money::from_major(286));

        view.apply_coupon(" SAVE10 ").unwrap();
        let summary = view.summary().unwrap();
        assert_eq!(summary.discount_amount, Money::from_major(20));
        assert_eq!(summary.total.to_string(), "262.40");

        // Survives a reload
        view.reload().await;
        assert_eq!(view.response().coupon.unwrap().code, "SAVE10");

        assert!(view.clear_coupon().unwrap().is_some());
        assert_eq!(view.summary().unwrap().total, Money::from_major(286));
    }

    #[tokio::test]
    async fn test_coupon_survives_failed_reload() {
        let store = Arc::new(
            InMemoryCartStore::new().with_entries(USER, vec![record("e-1", "p-1", 200, 1, 3)]),
        );
        let mut view = ready_view(store.clone()).await;
        view.apply_coupon("SAVE10").unwrap();

        store
            .fail_next(StoreOperation::FetchCart, StoreError::Http("reset".into()))
            .await;
        assert_eq!(view.reload().await, ViewStatus::Failed);
        assert!(view.response().coupon.is_none());

        assert_eq!(view.reload().await, ViewStatus::Ready);
        assert_eq!(view.response().coupon.unwrap().code, "SAVE10");
        assert_eq!(view.summary().unwrap().total.to_string(), "262.40");

        // A cleared coupon stays cleared
        view.clear_coupon().unwrap();
        view.reload().await;
        assert!(view.response().coupon.is_none());
    }

    #[tokio::test]
    async fn test_stale_stock_blocks_checkout() {
        let store = Arc::new(
            InMemoryCartStore::new().with_entries(USER, vec![record("e-1", "p-1", 100, 4, 2)]),
        );
        let mut view = ready_view(store.clone()).await;

        let response = view.response();
        assert!(!response.checkout_ready);
        assert_eq!(response.stock_conflicts, vec!["e-1"]);

        // Still above stock: rejected before anything is sent
        let err = view.set_quantity("e-1", 3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StockExceeded);
        assert_eq!(store.calls(StoreOperation::UpdateQuantity), 0);
        assert_eq!(view.cart().unwrap().find("e-1").unwrap().quantity, 4);

        view.set_quantity("e-1", 2).await.unwrap();
        assert!(view.response().checkout_ready);
    }
}
