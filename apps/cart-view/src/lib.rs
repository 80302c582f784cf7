//! # Shopfront Cart Library
//!
//! The cart page controller and its wiring.
//!
//! ## Module Organization
//! ```text
//! shopfront_cart/
//! ├── lib.rs          ◄─── You are here (wiring & tracing)
//! ├── view.rs         ◄─── CartView state machine
//! ├── config.rs       ◄─── AppConfig (TOML + env)
//! ├── render.rs       ◄─── Plain-text rendering for the preview binary
//! └── error.rs        ◄─── ApiError and Notice
//! ```
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  AppConfig ──┬──► rest_config() ──► RestCartStore ──┐                   │
//! │              │                     SessionAuth ─────┤                   │
//! │              ├──► retry_policy() ──► RetryingStore ◄┘                   │
//! │              ├──► coupon_book()  ──► StaticCouponBook                   │
//! │              └──► pricing_policy()                                      │
//! │                          │                                              │
//! │                          ▼                                              │
//! │                      CartView::new(store, auth, coupons, policy)        │
//! │                                                                         │
//! │  Fixture mode swaps the backend for InMemoryCartStore + StaticAuth.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod render;
pub mod view;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shopfront_core::User;
use shopfront_store::{
    InMemoryCartStore, RestCartStore, RetryingStore, SessionAuth, StaticAuth, StoreError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ErrorCode, Notice, NoticeLevel};
pub use render::render_text;
pub use view::{CartResponse, CartView, ViewState, ViewStatus};

/// User id that owns the rows of a fixture file.
pub const FIXTURE_USER_ID: &str = "fixture-user";

/// Failures while wiring up a view.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to read fixture {path}: {source}")]
    Fixture {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shopfront_store=trace` - Trace store calls only
/// - Default: `info,shopfront=debug`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shopfront=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A view over the hosted backend, with retries.
pub fn remote_view(config: &AppConfig) -> Result<CartView, StartupError> {
    let policy = config.retry_policy();
    let store = RetryingStore::new(RestCartStore::new(config.rest_config())?, policy.clone());
    let auth = RetryingStore::new(SessionAuth::new(config.rest_config())?, policy);

    info!(base_url = %config.backend.base_url, "Using hosted backend");
    Ok(CartView::new(
        Arc::new(store),
        Arc::new(auth),
        Arc::new(config.coupon_book()?),
        config.pricing_policy(),
    ))
}

/// A view over the cart records in a JSON fixture file.
pub fn fixture_view(config: &AppConfig, path: &Path) -> Result<CartView, StartupError> {
    let json = std::fs::read_to_string(path).map_err(|source| StartupError::Fixture {
        path: path.to_path_buf(),
        source,
    })?;
    let store = InMemoryCartStore::from_fixture_json(FIXTURE_USER_ID, &json)?;

    info!(?path, "Using cart fixture");
    Ok(CartView::new(
        Arc::new(store),
        Arc::new(StaticAuth::signed_in(User::new(FIXTURE_USER_ID))),
        Arc::new(config.coupon_book()?),
        config.pricing_policy(),
    ))
}
