//! Page-local search and promotion filters.

use serde::Serialize;

use crate::models::{CatalogPage, Product};

/// Marker returned with filtered listings: filters only saw the fetched page.
pub const FILTER_SCOPE_PAGE: &str = "page";

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub search_term: Option<String>,
    pub promo_only: bool,
}

impl FilterOptions {
    fn needle(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }
}

fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

/// Narrow an already fetched page. Both filters must pass.
pub fn apply_filters(page: &[Product], options: &FilterOptions) -> Vec<Product> {
    let needle = options.needle();
    page.iter()
        .filter(|p| needle.as_deref().map_or(true, |n| matches_search(p, n)))
        .filter(|p| !options.promo_only || p.promo_active)
        .cloned()
        .collect()
}

/// Products with an active, priced promotion.
pub fn promotions(items: &[Product]) -> Vec<Product> {
    items
        .iter()
        .filter(|p| p.has_displayable_promo())
        .cloned()
        .collect()
}

/// Pagination affordances for a filtered page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub page: u32,
    pub page_size: u32,
    /// Matching rows across the whole catalog, before page-local filters
    pub total_count: i64,
    pub total_pages: u32,
    /// Items left on this page after page-local filters
    pub displayed_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub filter_scope: &'static str,
}

impl PageSummary {
    pub fn new(page: &CatalogPage, displayed_count: usize) -> Self {
        let total_pages = page.total_pages();
        Self {
            page: page.params.page,
            page_size: page.params.page_size,
            total_count: page.total_count,
            total_pages,
            displayed_count,
            has_previous: page.params.page > 1,
            has_next: page.params.page < total_pages,
            filter_scope: FILTER_SCOPE_PAGE,
        }
    }
}
