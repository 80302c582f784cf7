//! # Retry Decorator
//!
//! [`RetryingStore`] wraps any store with a per-attempt timeout and
//! exponential backoff.
//!
//! ## Attempt Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   call ──► timeout(attempt) ──► Ok ─────────────────────────► return    │
//! │              │                                                          │
//! │              ├── elapsed ──► StoreError::Timeout ─┐                     │
//! │              └── Err(e) ──────────────────────────┤                     │
//! │                                                   ▼                     │
//! │                         retryable && retries left?                      │
//! │                           │                  │                          │
//! │                          yes                 no ──► return Err          │
//! │                           │                                             │
//! │                   sleep(next_backoff) ──► call again                    │
//! │                                                                         │
//! │  BACKOFF (defaults): 200ms, 400ms, 800ms … capped at 5s, 3 retries      │
//! │  Mutations run inside one idempotency key shared by every attempt.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use shopfront_core::{CartRecord, User};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{AuthProvider, CartStore};

tokio::task_local! {
    static IDEMPOTENCY_KEY: Uuid;
}

/// The idempotency key of the mutation running on this task, if any.
///
/// Set by [`RetryingStore`] so every retry of one write carries the same key.
pub fn current_idempotency_key() -> Option<Uuid> {
    IDEMPOTENCY_KEY.try_with(|key| *key).ok()
}

// =============================================================================
// Retry Policy
// =============================================================================

/// Timeout and backoff settings for store calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Limit on a single attempt.
    pub timeout: Duration,

    /// Retries after the first attempt (0 = no retry).
    pub max_retries: u32,

    /// Delay before the first retry.
    pub initial_backoff: Duration,

    /// Cap on the delay between retries.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            timeout: Duration::from_secs(10),
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry(timeout: Duration) -> Self {
        RetryPolicy {
            timeout,
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.timeout.is_zero() {
            return Err(StoreError::Config("retry timeout must be positive".into()));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(StoreError::Config(
                "initial_backoff must not exceed max_backoff".into(),
            ));
        }
        Ok(())
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            current_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

// =============================================================================
// RetryingStore
// =============================================================================

/// Decorates a [`CartStore`] (and [`AuthProvider`]) with timeouts and retries.
#[derive(Debug, Clone)]
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryingStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        RetryingStore { inner, policy }
    }

    /// Runs `call` until it succeeds, fails permanently, or retries run out.
    async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut backoff = self.policy.create_backoff();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let result = match timeout(self.policy.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout(self.policy.timeout)),
            };

            match result {
                Ok(value) => {
                    if attempt > 1 {
                        info!(operation, attempt, "Store call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt <= self.policy.max_retries => {
                    let delay = backoff.next_backoff().unwrap_or(self.policy.max_backoff);
                    warn!(operation, attempt, error = %err, ?delay, "Store call failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    debug!(
                        operation,
                        attempt,
                        error = %err,
                        retryable = err.is_retryable(),
                        "Store call failed"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// [`run`](Self::run) under a fresh idempotency key.
    async fn run_mutation<F, Fut>(&self, operation: &'static str, call: F) -> StoreResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<()>>,
    {
        let key = Uuid::new_v4();
        debug!(operation, idempotency_key = %key, "Starting store mutation");
        IDEMPOTENCY_KEY.scope(key, self.run(operation, call)).await
    }
}

#[async_trait]
impl<S: CartStore> CartStore for RetryingStore<S> {
    async fn fetch_cart_for_user(&self, user_id: &str) -> StoreResult<Vec<CartRecord>> {
        self.run("fetch_cart", || self.inner.fetch_cart_for_user(user_id))
            .await
    }

    async fn update_quantity(&self, entry_id: &str, quantity: i64) -> StoreResult<()> {
        self.run_mutation("update_quantity", || {
            self.inner.update_quantity(entry_id, quantity)
        })
        .await
    }

    async fn delete_entry(&self, entry_id: &str) -> StoreResult<()> {
        self.run_mutation("delete_entry", || self.inner.delete_entry(entry_id))
            .await
    }

    async fn insert_wishlist_entry(&self, user_id: &str, product_id: &str) -> StoreResult<()> {
        self.run_mutation("insert_wishlist", || {
            self.inner.insert_wishlist_entry(user_id, product_id)
        })
        .await
    }
}

#[async_trait]
impl<S: AuthProvider> AuthProvider for RetryingStore<S> {
    async fn current_user(&self) -> StoreResult<Option<User>> {
        self.run("current_user", || self.inner.current_user()).await
    }
}
