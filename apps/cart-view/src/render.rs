//! # Text Rendering
//!
//! Plain-text rendering of a [`CartResponse`], used by the preview binary.

use shopfront_core::{LineItem, Money};

use crate::config::AppConfig;
use crate::view::{CartResponse, ViewStatus};

/// Renders the cart page as lines of text.
pub fn render_text(response: &CartResponse, config: &AppConfig) -> String {
    let mut lines = Vec::new();

    match response.status {
        ViewStatus::Loading => lines.push("Loading your cart...".to_string()),
        ViewStatus::Anonymous => lines.push("Sign in to see your cart.".to_string()),
        ViewStatus::Failed => {
            if let Some(error) = &response.error {
                lines.push(error.message.clone());
                if error.retryable {
                    lines.push("Try again in a moment.".to_string());
                }
            }
        }
        ViewStatus::Ready if response.items.is_empty() => {
            lines.push("Your cart is empty.".to_string());
        }
        ViewStatus::Ready => {
            lines.push(format!("Shopping Cart ({} items)", response.items.len()));
            lines.push(String::new());
            for item in &response.items {
                render_item(&mut lines, item, config);
            }
            render_totals(&mut lines, response, config);
        }
    }

    if let Some(notice) = &response.notice {
        lines.push(String::new());
        lines.push(format!("» {}", notice.message));
    }

    lines.join("\n")
}

fn render_item(lines: &mut Vec<String>, item: &LineItem, config: &AppConfig) {
    let variant: Vec<&str> = [item.size.as_deref(), item.color.as_deref()]
        .into_iter()
        .flatten()
        .collect();

    let mut title = item.name.clone();
    if let Some(brand) = &item.brand {
        title = format!("{brand} {title}");
    }
    if !variant.is_empty() {
        title = format!("{title} [{}]", variant.join(", "));
    }

    lines.push(format!(
        "  {}  {} x {} = {}",
        title,
        item.quantity,
        config.format_currency(item.unit_price),
        config.format_currency(item.line_total()),
    ));

    if let Some(original) = item.original_price {
        lines.push(format!("      was {}", config.format_currency(original)));
    }
    if item.exceeds_stock() {
        lines.push(format!("      only {} left in stock", item.stock.max(0)));
    } else if !item.can_increment() {
        lines.push("      limit reached".to_string());
    }
}

fn render_totals(lines: &mut Vec<String>, response: &CartResponse, config: &AppConfig) {
    let Some(totals) = &response.totals else {
        return;
    };
    let tax_rate = config.pricing_policy().tax_rate;

    lines.push(String::new());
    lines.push(row("Subtotal", config.format_currency(totals.subtotal)));

    if let Some(coupon) = &response.coupon {
        lines.push(row(
            &format!("Discount ({}, {})", coupon.code, coupon.discount_rate),
            config.format_currency(Money::zero() - totals.discount_amount),
        ));
    }

    lines.push(row(&format!("GST ({tax_rate})"), config.format_currency(totals.tax_amount)));

    let shipping = if totals.has_free_shipping() {
        "FREE".to_string()
    } else {
        config.format_currency(totals.shipping_fee)
    };
    lines.push(row("Shipping", shipping));
    lines.push(row("Total", config.format_currency(totals.total)));

    if !response.checkout_ready {
        lines.push("Lower the highlighted quantities to check out.".to_string());
    }
}

fn row(label: &str, value: String) -> String {
    format!("  {label:<24}{value:>12}")
}
