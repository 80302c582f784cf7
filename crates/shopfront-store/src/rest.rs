//! # Hosted Backend Client
//!
//! [`CartStore`] and [`AuthProvider`] over the hosted backend's PostgREST-style
//! HTTP API.
//!
//! ## Request Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation               Method   Path                                  │
//! │  ─────────               ──────   ────                                  │
//! │  fetch_cart_for_user     GET      /rest/v1/cart_items?user_id=eq.{id}   │
//! │                                   &select=…products(…product_images(…)) │
//! │  update_quantity         PATCH    /rest/v1/cart_items?id=eq.{id}        │
//! │  delete_entry            DELETE   /rest/v1/cart_items?id=eq.{id}        │
//! │  insert_wishlist_entry   POST     /rest/v1/wishlist                     │
//! │  current_user            GET      /auth/v1/user                         │
//! │                                                                         │
//! │  Every request: apikey + Authorization: Bearer <session or api key>     │
//! │  Mutations:     Idempotency-Key: <uuid v4, stable across retries>       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use shopfront_core::{CartRecord, User};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::retry::current_idempotency_key;
use crate::store::{AuthProvider, CartStore};

/// Columns requested for a cart fetch, with the product and its images embedded.
pub const CART_SELECT: &str = "id,quantity,size,color,created_at,\
products(id,name,category,price,discount_price,stock,brand,\
product_images(image_url,is_main))";

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,

    /// Public API key sent as `apikey` on every request.
    pub api_key: String,

    /// Signed-in session token. Falls back to the API key when absent.
    pub access_token: Option<String>,

    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl Default for RestConfig {
    fn default() -> Self {
        RestConfig {
            base_url: String::new(),
            api_key: String::new(),
            access_token: None,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl RestConfig {
    /// Checks the config and parses the base URL.
    pub fn validate(&self) -> StoreResult<Url> {
        if self.base_url.trim().is_empty() {
            return Err(StoreError::Config("backend base_url is not set".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(StoreError::Config("backend api_key is not set".into()));
        }

        let url = Url::parse(self.base_url.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(StoreError::Config(format!("unsupported URL scheme: {other}"))),
        }
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }
}

// =============================================================================
// Shared client
// =============================================================================

#[derive(Debug, Clone)]
struct BackendClient {
    client: Client,
    config: RestConfig,
    base: Url,
}

impl BackendClient {
    fn new(config: RestConfig) -> StoreResult<Self> {
        let base = config.validate()?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        Ok(BackendClient { client, config, base })
    }

    fn endpoint(&self, path: &str) -> StoreResult<Url> {
        Ok(self.base.join(path)?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.config.bearer())
    }
}

/// Passes success responses through and turns the rest into a [`StoreError`].
async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY)
        .collect();

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        warn!(status = %status, body = %body, "Backend returned retryable status");
    } else {
        debug!(status = %status, body = %body, "Backend rejected request");
    }

    Err(StoreError::from_status(status.as_u16(), body))
}

fn idempotency_key() -> String {
    current_idempotency_key()
        .unwrap_or_else(Uuid::new_v4)
        .to_string()
}

// =============================================================================
// RestCartStore
// =============================================================================

/// Cart store backed by the hosted backend's `cart_items` and `wishlist` tables.
#[derive(Debug, Clone)]
pub struct RestCartStore {
    backend: BackendClient,
}

impl RestCartStore {
    pub fn new(config: RestConfig) -> StoreResult<Self> {
        Ok(RestCartStore {
            backend: BackendClient::new(config)?,
        })
    }

    /// URL for fetching a user's cart rows.
    pub fn cart_url(&self, user_id: &str) -> StoreResult<Url> {
        let mut url = self.backend.endpoint("rest/v1/cart_items")?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{user_id}"))
            .append_pair("select", CART_SELECT)
            .append_pair("order", "created_at.asc");
        Ok(url)
    }

    /// URL addressing one cart row.
    pub fn entry_url(&self, entry_id: &str) -> StoreResult<Url> {
        let mut url = self.backend.endpoint("rest/v1/cart_items")?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{entry_id}"));
        Ok(url)
    }

    fn wishlist_url(&self) -> StoreResult<Url> {
        self.backend.endpoint("rest/v1/wishlist")
    }
}

#[async_trait]
impl CartStore for RestCartStore {
    async fn fetch_cart_for_user(&self, user_id: &str) -> StoreResult<Vec<CartRecord>> {
        let url = self.cart_url(user_id)?;
        let request = self.backend.authorized(self.backend.client.get(url));

        let response = check_status(request.send().await?).await?;
        let records: Vec<CartRecord> = response.json().await?;

        debug!(user_id, count = records.len(), "Fetched cart rows");
        Ok(records)
    }

    async fn update_quantity(&self, entry_id: &str, quantity: i64) -> StoreResult<()> {
        let url = self.entry_url(entry_id)?;
        let request = self
            .backend
            .authorized(self.backend.client.patch(url))
            .header(IDEMPOTENCY_HEADER, idempotency_key())
            .header("Prefer", "return=representation")
            .json(&json!({ "quantity": quantity }));

        let response = check_status(request.send().await?).await?;
        let updated: Vec<serde_json::Value> = response.json().await?;

        if updated.is_empty() {
            return Err(StoreError::NotFound {
                entity: "cart entry",
                id: entry_id.to_string(),
            });
        }

        debug!(entry_id, quantity, "Updated cart quantity");
        Ok(())
    }

    async fn delete_entry(&self, entry_id: &str) -> StoreResult<()> {
        let url = self.entry_url(entry_id)?;
        let request = self
            .backend
            .authorized(self.backend.client.delete(url))
            .header(IDEMPOTENCY_HEADER, idempotency_key());

        check_status(request.send().await?).await?;

        debug!(entry_id, "Deleted cart entry");
        Ok(())
    }

    async fn insert_wishlist_entry(&self, user_id: &str, product_id: &str) -> StoreResult<()> {
        let url = self.wishlist_url()?;
        let request = self
            .backend
            .authorized(self.backend.client.post(url))
            .header(IDEMPOTENCY_HEADER, idempotency_key())
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(&json!({ "user_id": user_id, "product_id": product_id }));

        check_status(request.send().await?).await?;

        debug!(user_id, product_id, "Added wishlist entry");
        Ok(())
    }
}

// =============================================================================
// SessionAuth
// =============================================================================

/// Resolves the shopper from the configured session token.
///
/// No token, or a token the backend rejects with 401, means anonymous.
#[derive(Debug, Clone)]
pub struct SessionAuth {
    backend: BackendClient,
}

impl SessionAuth {
    pub fn new(config: RestConfig) -> StoreResult<Self> {
        Ok(SessionAuth {
            backend: BackendClient::new(config)?,
        })
    }
}

#[async_trait]
impl AuthProvider for SessionAuth {
    async fn current_user(&self) -> StoreResult<Option<User>> {
        if self.backend.config.access_token.is_none() {
            return Ok(None);
        }

        let url = self.backend.endpoint("auth/v1/user")?;
        let response = self
            .backend
            .authorized(self.backend.client.get(url))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Session token rejected, treating as anonymous");
            return Ok(None);
        }

        let user: User = check_status(response).await?.json().await?;
        Ok(Some(user))
    }
}
