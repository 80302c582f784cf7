//! # Shopfront Cart Preview
//!
//! Loads the cart page once and prints it.
//!
//! ```text
//! shopfront-cart [--config cart.toml] [--coupon CODE] [--json] [FIXTURE.json]
//!
//!   FIXTURE.json   cart records to serve from memory; omit to use the backend
//!   --config       config file (default: platform config dir, cart.toml)
//!   --coupon       apply a coupon code after loading
//!   --json         print the view response as JSON
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging to stderr)
//! 2. Load `AppConfig`
//! 3. Build the view over the fixture or the hosted backend
//! 4. Load, optionally apply a coupon, print

use std::path::PathBuf;
use std::process::ExitCode;

use shopfront_cart::{fixture_view, init_tracing, remote_view, render_text, AppConfig, CartView};
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    coupon: Option<String>,
    json: bool,
    fixture: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--coupon" => {
                parsed.coupon = Some(args.next().ok_or("--coupon needs a code")?);
            }
            "--json" => parsed.json = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option: {flag}")),
            path => {
                if parsed.fixture.is_some() {
                    return Err("only one fixture file may be given".to_string());
                }
                parsed.fixture = Some(PathBuf::from(path));
            }
        }
    }

    Ok(parsed)
}

/// Applies the `--coupon` code. A rejected code is logged and left as a
/// notice in the output; the preview carries on either way.
fn apply_requested_coupon(view: &mut CartView, code: &str) -> bool {
    match view.apply_coupon(code) {
        Ok(coupon) => {
            info!(code = %coupon.code, rate = %coupon.discount_rate, "Coupon applied");
            true
        }
        Err(err) => {
            warn!(code, error = %err.message, "Coupon not applied");
            false
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: shopfront-cart [--config PATH] [--coupon CODE] [--json] [FIXTURE.json]");
            return ExitCode::from(2);
        }
    };

    let config = match AppConfig::load(args.config) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let view = match &args.fixture {
        Some(path) => fixture_view(&config, path),
        None => remote_view(&config),
    };
    let mut view = match view {
        Ok(view) => view,
        Err(err) => {
            error!(error = %err, "Failed to start cart view");
            return ExitCode::FAILURE;
        }
    };

    let status = view.load().await;
    info!(%status, "Cart view loaded");

    if let Some(code) = &args.coupon {
        apply_requested_coupon(&mut view, code);
    }

    let response = view.response();
    if args.json {
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!(error = %err, "Failed to serialize cart view");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", render_text(&response, &config));
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["--config", "cart.toml", "--json", "cart.json", "--coupon", "SAVE10"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("cart.toml")));
        assert_eq!(parsed.fixture, Some(PathBuf::from("cart.json")));
        assert_eq!(parsed.coupon.as_deref(), Some("SAVE10"));
        assert!(parsed.json);

        let parsed = args(&[]).unwrap();
        assert!(parsed.fixture.is_none());
    }

    #[tokio::test]
    async fn test_rejected_coupon_is_reported() {
        use std::sync::Arc;

        use shopfront_cart::ErrorCode;
        use shopfront_core::{PricingPolicy, StaticCouponBook, User};
        use shopfront_store::{InMemoryCartStore, StaticAuth};

        let store = InMemoryCartStore::from_fixture_json(
            "user-1",
            r#"[{ "entryId": "row-1", "quantity": 1,
                 "product": { "id": "p-1", "name": "Mug", "price": "200", "stock": 3 } }]"#,
        )
        .unwrap();
        let mut view = CartView::new(
            Arc::new(store),
            Arc::new(StaticAuth::signed_in(User::new("user-1"))),
            Arc::new(StaticCouponBook::standard()),
            PricingPolicy::default(),
        );
        view.load().await;

        assert!(!apply_requested_coupon(&mut view, "SAVE99"));
        let response = view.response();
        assert!(response.coupon.is_none());
        assert_eq!(response.notice.unwrap().code, Some(ErrorCode::InvalidCoupon));

        assert!(apply_requested_coupon(&mut view, "SAVE10"));
        assert_eq!(view.response().coupon.unwrap().code, "SAVE10");
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
    }
}
