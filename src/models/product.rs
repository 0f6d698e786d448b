//! Product model and the admin form payload.

use serde::{Deserialize, Serialize};

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_price: Option<i64>,
    pub promo_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub category: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    /// Price a customer pays right now.
    pub fn effective_price(&self) -> i64 {
        effective_price(self.price, self.promo_price, self.promo_active)
    }

    /// Whether the product belongs in the promotions carousel.
    pub fn has_displayable_promo(&self) -> bool {
        self.promo_active && self.promo_price.is_some()
    }
}

/// Request body for creating or replacing a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub promo_price: Option<i64>,
    #[serde(default)]
    pub promo_active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    pub category: String,
}

impl ProductInput {
    /// `promo_price < price` whenever a promotion is active and priced.
    ///
    /// Not enforced on write; callers only log violations.
    pub fn promo_is_consistent(&self) -> bool {
        match (self.promo_active, self.promo_price) {
            (true, Some(promo)) => promo < self.price,
            _ => true,
        }
    }
}

/// Promo price when the promotion is active and priced, list price otherwise.
pub fn effective_price(price: i64, promo_price: Option<i64>, promo_active: bool) -> i64 {
    match (promo_active, promo_price) {
        (true, Some(promo)) => promo,
        _ => price,
    }
}
