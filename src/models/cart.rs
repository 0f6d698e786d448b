//! Cart line items and their persisted form.

use serde::{Deserialize, Serialize};

use super::product::{effective_price, Product};

/// Schema version written with every persisted cart.
pub const CART_SCHEMA_VERSION: u32 = 1;

/// Largest quantity a single cart line can hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Snapshot of a product taken when it was added to the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product id
    pub id: String,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub promo_price: Option<i64>,
    #[serde(default)]
    pub promo_active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            promo_price: product.promo_price,
            promo_active: product.promo_active,
            image_url: product.image_url.clone(),
            quantity: 1,
        }
    }

    pub fn unit_price(&self) -> i64 {
        effective_price(self.price, self.promo_price, self.promo_active)
    }

    /// Saturates instead of wrapping on extreme prices.
    pub fn line_total(&self) -> i64 {
        self.unit_price().saturating_mul(i64::from(self.quantity))
    }
}

/// On-disk representation of a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedCart {
    pub version: u32,
    pub items: Vec<CartItem>,
}

/// Request body for adding a product to a cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
}

/// Request body for changing a line quantity.
#[derive(Debug, Clone, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// Cart as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub total: i64,
    pub formatted_total: String,
}

/// Result of a checkout hand-off.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLink {
    pub url: String,
    pub total: i64,
}
