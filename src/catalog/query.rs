//! Cached read side of the catalog.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use super::CategorySet;
use crate::db::Gateway;
use crate::errors::AppError;
use crate::models::{
    CatalogPage, ListProductsParams, NormalizedParams, Product, ProductQuery, DEFAULT_PAGE,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

const MAX_CACHED_PAGES: u64 = 1_000;
const MAX_CACHED_PRODUCTS: u64 = 10_000;

/// Cache key of a listing. The generation moves on every successful mutation, so a
/// load that started before an invalidation can never be served after it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PageKey {
    generation: u64,
    params: NormalizedParams,
}

/// Freshness windows of the catalog caches.
#[derive(Debug, Clone)]
pub struct CatalogTtl {
    pub products: Duration,
    pub categories: Duration,
}

/// Product listings, single products and the category list, each cached independently.
pub struct CatalogQuery {
    gateway: Arc<dyn Gateway>,
    categories: CategorySet,
    generation: AtomicU64,
    pages: Cache<PageKey, CatalogPage>,
    products: Cache<(u64, String), Option<Product>>,
    categories_in_use: Cache<u64, Vec<String>>,
}

impl CatalogQuery {
    pub fn new(gateway: Arc<dyn Gateway>, categories: CategorySet, ttl: CatalogTtl) -> Self {
        Self {
            gateway,
            categories,
            generation: AtomicU64::new(0),
            pages: Cache::builder()
                .max_capacity(MAX_CACHED_PAGES)
                .time_to_live(ttl.products)
                .build(),
            products: Cache::builder()
                .max_capacity(MAX_CACHED_PRODUCTS)
                .time_to_live(ttl.products)
                .build(),
            categories_in_use: Cache::builder()
                .max_capacity(4)
                .time_to_live(ttl.categories)
                .build(),
        }
    }

    /// The tenant's configured category set.
    pub fn available_categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Apply defaults and reject out-of-range parameters.
    ///
    /// Unpaginated requests are normalized to page 1 with a page size of 0 (unbounded),
    /// so they share one cache entry per category.
    pub fn normalize(&self, params: &ListProductsParams) -> Result<NormalizedParams, AppError> {
        let page = params.page.unwrap_or(DEFAULT_PAGE);
        let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        let enable_pagination = params.enable_pagination.unwrap_or(true);

        if page < 1 {
            return Err(AppError::validation("page", "Page must be at least 1"));
        }
        if page_size < 1 {
            return Err(AppError::validation("pageSize", "Page size must be at least 1"));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(AppError::validation(
                "pageSize",
                format!("Page size must be at most {}", MAX_PAGE_SIZE),
            ));
        }

        let category = match params.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(category) => {
                if !self.categories.contains(category) {
                    return Err(AppError::validation(
                        "category",
                        format!("Unknown category: {}", category),
                    ));
                }
                Some(category.to_string())
            }
        };

        Ok(if enable_pagination {
            NormalizedParams {
                page,
                page_size,
                category,
                enable_pagination,
            }
        } else {
            NormalizedParams {
                page: 1,
                page_size: 0,
                category,
                enable_pagination,
            }
        })
    }

    /// List products newest first, from cache when fresh.
    pub async fn list_products(&self, params: &ListProductsParams) -> Result<CatalogPage, AppError> {
        let normalized = self.normalize(params)?;
        let key = PageKey {
            generation: self.generation(),
            params: normalized.clone(),
        };

        let gateway = self.gateway.clone();
        self.pages
            .try_get_with(key, async move {
                tracing::debug!(?normalized, "Fetching product page");
                let rows = gateway
                    .select_products(&ProductQuery {
                        category: normalized.category.clone(),
                        range: normalized.range(),
                    })
                    .await?;
                Ok::<_, AppError>(CatalogPage {
                    items: rows.items,
                    total_count: rows.total_count,
                    params: normalized,
                })
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// A single product; `None` when it does not exist.
    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, AppError> {
        let gateway = self.gateway.clone();
        let owned_id = id.to_string();
        self.products
            .try_get_with((self.generation(), id.to_string()), async move {
                gateway.get_product(&owned_id).await
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Distinct categories currently used by products, sorted.
    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        let gateway = self.gateway.clone();
        self.categories_in_use
            .try_get_with(self.generation(), async move {
                tracing::debug!("Fetching product categories");
                gateway.product_categories().await
            })
            .await
            .map_err(|e| (*e).clone())
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Drop every cached listing, product and category list.
    pub(super) fn invalidate_all(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.pages.invalidate_all();
        self.products.invalidate_all();
        self.categories_in_use.invalidate_all();
        tracing::debug!(generation, "Catalog caches invalidated");
    }
}
