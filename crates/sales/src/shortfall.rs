//! Structured confirm-failure reporting.
//!
//! When a confirmation is rejected, every failing line item is reported so
//! the caller sees the whole picture in one round trip.

use serde::Serialize;

use partsdesk_products::Product;

/// One failing line item from a rejected confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockShortfall {
    /// SKU of the failing product; `None` when the product no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<i64>,
    pub message: String,
}

impl StockShortfall {
    /// Requested quantity exceeds the locked on-hand quantity.
    pub fn insufficient(product: &Product, available: i64, requested: i64) -> Self {
        Self {
            product: Some(product.sku().to_string()),
            product_name: Some(product.name().to_string()),
            available: Some(available),
            requested: Some(requested),
            message: format!(
                "Insufficient stock for {}. Available: {available}, Requested: {requested}",
                product.name()
            ),
        }
    }

    /// The line item's product reference points at a deleted product.
    pub fn missing_product() -> Self {
        Self {
            product: None,
            product_name: None,
            available: None,
            requested: None,
            message: "Product no longer exists".to_string(),
        }
    }

    /// Primary error detail for a batch of failures: a single failing item
    /// surfaces its own message, several collapse to an aggregate one.
    pub fn summary(shortfalls: &[StockShortfall]) -> String {
        match shortfalls {
            [only] => only.message.clone(),
            _ => "Insufficient stock for one or more items".to_string(),
        }
    }
}
