//! Catalog query parameters and result pages.

use serde::{Deserialize, Serialize};

use super::Product;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page a listing may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Parameters of a product listing, as requested.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub enable_pagination: Option<bool>,
}

/// Parameters after defaults are applied. Two requests share a cache entry
/// exactly when their normalized parameters are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedParams {
    pub page: u32,
    pub page_size: u32,
    pub category: Option<String>,
    pub enable_pagination: bool,
}

impl NormalizedParams {
    /// Row range `(offset, limit)` to request from the gateway.
    pub fn range(&self) -> Option<(i64, i64)> {
        if !self.enable_pagination {
            return None;
        }
        let offset =
            i64::from(self.page.saturating_sub(1)).saturating_mul(i64::from(self.page_size));
        Some((offset, i64::from(self.page_size)))
    }
}

/// Query handed to the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<String>,
    /// `(offset, limit)`; `None` selects every matching row
    pub range: Option<(i64, i64)>,
}

/// Rows of one listing plus the exact count of all matching rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRows {
    pub items: Vec<Product>,
    pub total_count: i64,
}

/// One cached listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub items: Vec<Product>,
    pub total_count: i64,
    pub params: NormalizedParams,
}

impl CatalogPage {
    /// `ceil(total_count / page_size)`; a single page when pagination is off.
    pub fn total_pages(&self) -> u32 {
        if !self.params.enable_pagination {
            return 1;
        }
        let size = i64::from(self.params.page_size.max(1));
        ((self.total_count + size - 1) / size) as u32
    }
}
