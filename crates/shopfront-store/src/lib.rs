//! # shopfront-store: Remote Cart Store
//!
//! Everything the cart page reads from or writes to the hosted backend goes
//! through this crate.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Store Layer Architecture                         │
//! │                                                                         │
//! │   CartView                                                              │
//! │      │  Arc<dyn CartStore>          Arc<dyn AuthProvider>               │
//! │      ▼                                    ▼                             │
//! │  ┌────────────────────────────────────────────────────────────────┐    │
//! │  │              RetryingStore (timeout + backoff)                 │    │
//! │  └───────────────┬──────────────────────────────┬─────────────────┘    │
//! │                  ▼                              ▼                       │
//! │  ┌───────────────────────────┐  ┌──────────────────────────────────┐   │
//! │  │ RestCartStore/SessionAuth │  │ InMemoryCartStore / StaticAuth   │   │
//! │  │ hosted backend over HTTP  │  │ fixtures, previews, tests        │   │
//! │  └───────────────────────────┘  └──────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`store`] - `CartStore` and `AuthProvider` traits
//! - [`memory`] - In-process store with failure injection
//! - [`rest`] - Hosted backend client
//! - [`retry`] - Timeout and retry decorator, idempotency keys
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopfront_store::{RestCartStore, RestConfig, RetryPolicy, RetryingStore};
//!
//! let rest = RestCartStore::new(RestConfig { base_url, api_key, ..Default::default() })?;
//! let store = Arc::new(RetryingStore::new(rest, RetryPolicy::default()));
//!
//! let rows = store.fetch_cart_for_user(&user.id).await?;
//! ```

pub mod error;
pub mod memory;
pub mod rest;
pub mod retry;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryCartStore, StaticAuth, StoreOperation, WishlistEntry};
pub use rest::{RestCartStore, RestConfig, SessionAuth};
pub use retry::{current_idempotency_key, RetryPolicy, RetryingStore};
pub use store::{AuthProvider, CartStore};
