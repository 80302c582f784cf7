//! # Cart Page Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPFRONT_BACKEND_URL=https://xyz.supabase.co                      │
//! │     SHOPFRONT_TAX_RATE_BPS=1800                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shopfront/cart.toml (Linux)                              │
//! │     ~/Library/Application Support/com.shopfront.cart/cart.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     18% GST, free shipping above 500, flat fee 50, SAVE10              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [pricing]
//! tax_rate_bps = 1800
//! free_shipping_threshold = "500"
//! flat_shipping_fee = "50"
//! coupons = { SAVE10 = 10 }
//!
//! [backend]
//! base_url = "https://xyz.supabase.co"
//! api_key = "public-anon-key"
//! access_token = "session-jwt"      # optional
//!
//! [retry]
//! timeout_ms = 10000
//! max_retries = 3
//!
//! [display]
//! currency_symbol = "₹"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shopfront_core::{
    DiscountRule, Money, PricingPolicy, Rate, StaticCouponBook, DEFAULT_FLAT_SHIPPING_FEE,
    DEFAULT_FREE_SHIPPING_THRESHOLD, DEFAULT_TAX_RATE_BPS,
};
use shopfront_store::{RestConfig, RetryPolicy};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Sections
// =============================================================================

/// `[pricing]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,

    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: Money,

    #[serde(default = "default_flat_shipping_fee")]
    pub flat_shipping_fee: Money,

    /// Coupon code → percentage off.
    #[serde(default = "default_coupons")]
    pub coupons: BTreeMap<String, u32>,
}

/// `[backend]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// `[retry]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

/// `[display]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_tax_rate_bps() -> u32 {
    DEFAULT_TAX_RATE_BPS
}
fn default_free_shipping_threshold() -> Money {
    Money::from_major(DEFAULT_FREE_SHIPPING_THRESHOLD)
}
fn default_flat_shipping_fee() -> Money {
    Money::from_major(DEFAULT_FLAT_SHIPPING_FEE)
}
fn default_coupons() -> BTreeMap<String, u32> {
    BTreeMap::from([("SAVE10".to_string(), 10)])
}
fn default_connect_timeout_ms() -> u64 {
    5_000
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    200
}
fn default_max_backoff_ms() -> u64 {
    5_000
}
fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            tax_rate_bps: default_tax_rate_bps(),
            free_shipping_threshold: default_free_shipping_threshold(),
            flat_shipping_fee: default_flat_shipping_fee(),
            coupons: default_coupons(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Complete cart page configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.pricing_policy()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        self.coupon_book()?;

        self.retry_policy()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.display.currency_symbol.chars().count() > 4 {
            return Err(ConfigError::Invalid(
                "currency_symbol must be at most 4 characters".into(),
            ));
        }

        Ok(())
    }

    /// Applies `SHOPFRONT_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SHOPFRONT_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.base_url = url;
        }

        if let Some(key) = var("SHOPFRONT_API_KEY") {
            self.backend.api_key = key;
        }

        if let Some(token) = var("SHOPFRONT_ACCESS_TOKEN") {
            self.backend.access_token = Some(token).filter(|t| !t.is_empty());
        }

        if let Some(bps) = var("SHOPFRONT_TAX_RATE_BPS") {
            match bps.parse() {
                Ok(parsed) => self.pricing.tax_rate_bps = parsed,
                Err(_) => warn!(value = %bps, "Ignoring invalid SHOPFRONT_TAX_RATE_BPS"),
            }
        }

        if let Some(ms) = var("SHOPFRONT_TIMEOUT_MS") {
            match ms.parse() {
                Ok(parsed) => self.retry.timeout_ms = parsed,
                Err(_) => warn!(value = %ms, "Ignoring invalid SHOPFRONT_TIMEOUT_MS"),
            }
        }

        if let Some(retries) = var("SHOPFRONT_MAX_RETRIES") {
            match retries.parse() {
                Ok(parsed) => self.retry.max_retries = parsed,
                Err(_) => warn!(value = %retries, "Ignoring invalid SHOPFRONT_MAX_RETRIES"),
            }
        }

        if let Some(symbol) = var("SHOPFRONT_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopfront", "cart")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Derived settings
    // =========================================================================

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            tax_rate: Rate::from_bps(self.pricing.tax_rate_bps),
            free_shipping_threshold: self.pricing.free_shipping_threshold,
            flat_shipping_fee: self.pricing.flat_shipping_fee,
        }
    }

    /// Builds the coupon book from `[pricing].coupons`.
    pub fn coupon_book(&self) -> ConfigResult<StaticCouponBook> {
        let mut book = StaticCouponBook::new();
        for (code, pct) in &self.pricing.coupons {
            book.insert(code.as_str(), DiscountRule::percent_off(*pct))
                .map_err(|e| ConfigError::Invalid(format!("coupon {code}: {e}")))?;
        }
        Ok(book)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(self.retry.timeout_ms),
            max_retries: self.retry.max_retries,
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
        }
    }

    pub fn rest_config(&self) -> RestConfig {
        RestConfig {
            base_url: self.backend.base_url.clone(),
            api_key: self.backend.api_key.clone(),
            access_token: self.backend.access_token.clone(),
            connect_timeout: Duration::from_millis(self.backend.connect_timeout_ms),
        }
    }

    /// Formats an amount with the configured currency symbol, e.g. `₹262.40`.
    pub fn format_currency(&self, amount: Money) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.display.currency_symbol, Money::zero() - amount)
        } else {
            format!("{}{}", self.display.currency_symbol, amount)
        }
    }
}
