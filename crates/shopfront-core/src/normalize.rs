//! # Record Normalization
//!
//! Turns backend cart rows into canonical [`LineItem`]s.
//!
//! ```text
//! CartRecord { entry_id, quantity, size, color, product { price, discount_price, images } }
//!      │
//!      ▼
//! normalize() ← pure, never fails
//!      │
//!      ├── unit_price     = discount_price ?? price
//!      ├── original_price = price, only when discount_price is set
//!      └── image          = main image url ?? PLACEHOLDER_IMAGE_URL
//! ```

use crate::types::{CartRecord, LineItem, ProductImage};
use crate::PLACEHOLDER_IMAGE_URL;

/// Converts one backend cart row into a line item.
///
/// Missing optional fields degrade to `None` or the placeholder image;
/// missing stock degrades to 0.
///
/// ## Example
/// ```rust
/// use shopfront_core::normalize::normalize;
/// use shopfront_core::types::{CartRecord, ProductRecord};
/// use shopfront_core::{Money, PLACEHOLDER_IMAGE_URL};
///
/// let record = CartRecord {
///     entry_id: "row-1".into(),
///     quantity: 1,
///     size: None,
///     color: None,
///     created_at: None,
///     product: ProductRecord {
///         id: "p-1".into(),
///         name: "Cap".into(),
///         category: None,
///         price: Money::from_major(300),
///         discount_price: Some(Money::from_major(200)),
///         stock: Some(5),
///         brand: None,
///         images: vec![],
///     },
/// };
///
/// let item = normalize(&record);
/// assert_eq!(item.unit_price, Money::from_major(200));
/// assert_eq!(item.original_price, Some(Money::from_major(300)));
/// assert_eq!(item.image, PLACEHOLDER_IMAGE_URL);
/// ```
pub fn normalize(record: &CartRecord) -> LineItem {
    let product = &record.product;

    let (unit_price, original_price) = match product.discount_price {
        Some(discounted) => (discounted, Some(product.price)),
        None => (product.price, None),
    };

    LineItem {
        cart_entry_id: record.entry_id.clone(),
        product_id: product.id.clone(),
        name: product.name.clone(),
        category: product.category.clone(),
        brand: product.brand.clone(),
        unit_price,
        original_price,
        stock: product.stock.unwrap_or(0),
        quantity: record.quantity,
        size: record.size.clone(),
        color: record.color.clone(),
        image: main_image_url(&product.images),
    }
}

/// Normalizes a whole fetch result, preserving backend order.
pub fn normalize_all(records: &[CartRecord]) -> Vec<LineItem> {
    records.iter().map(normalize).collect()
}

impl From<&CartRecord> for LineItem {
    fn from(record: &CartRecord) -> Self {
        normalize(record)
    }
}

/// URL of the first image flagged main, else the placeholder.
fn main_image_url(images: &[ProductImage]) -> String {
    images
        .iter()
        .find(|image| image.is_main)
        .map(|image| image.url.clone())
        .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::ProductRecord;

    fn record(discount_price: Option<Money>, images: Vec<ProductImage>) -> CartRecord {
        CartRecord {
            entry_id: "row-7".to_string(),
            quantity: 2,
            size: Some("M".to_string()),
            color: Some("Navy".to_string()),
            created_at: None,
            product: ProductRecord {
                id: "p-42".to_string(),
                name: "Oxford Shirt".to_string(),
                category: Some("Shirts".to_string()),
                price: Money::from_major(1000),
                discount_price,
                stock: Some(8),
                brand: Some("Acme".to_string()),
                images,
            },
        }
    }

    fn image(url: &str, is_main: bool) -> ProductImage {
        ProductImage {
            url: url.to_string(),
            is_main,
        }
    }

    #[test]
    fn test_discount_price_wins() {
        let item = normalize(&record(Some(Money::from_major(750)), vec![]));
        assert_eq!(item.unit_price, Money::from_major(750));
        assert_eq!(item.original_price, Some(Money::from_major(1000)));
    }

    #[test]
    fn test_list_price_without_discount() {
        let item = normalize(&record(None, vec![]));
        assert_eq!(item.unit_price, Money::from_major(1000));
        assert_eq!(item.original_price, None);
    }

    #[test]
    fn test_main_image_selected() {
        let item = normalize(&record(
            None,
            vec![
                image("https://cdn.example.com/back.jpg", false),
                image("https://cdn.example.com/front.jpg", true),
            ],
        ));
        assert_eq!(item.image, "https://cdn.example.com/front.jpg");
    }

    #[test]
    fn test_placeholder_when_no_main_image() {
        let item = normalize(&record(
            None,
            vec![image("https://cdn.example.com/back.jpg", false)],
        ));
        assert_eq!(item.image, PLACEHOLDER_IMAGE_URL);

        let item = normalize(&record(None, vec![]));
        assert_eq!(item.image, PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn test_identity_and_variant_fields_copied() {
        let item = normalize(&record(None, vec![]));
        assert_eq!(item.cart_entry_id, "row-7");
        assert_eq!(item.product_id, "p-42");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.stock, 8);
        assert_eq!(item.size.as_deref(), Some("M"));
        assert_eq!(item.color.as_deref(), Some("Navy"));
        assert_eq!(item.brand.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_missing_stock_degrades_to_zero() {
        let mut raw = record(None, vec![]);
        raw.product.stock = None;
        let item = normalize(&raw);
        assert_eq!(item.stock, 0);
        assert!(item.exceeds_stock());
    }
}
