//! Catalog API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, success_with_message, ApiResult};
use crate::catalog::{apply_filters, promotions, FilterOptions, PageSummary};
use crate::checkout::{product_link, require_number};
use crate::errors::AppError;
use crate::models::{ListProductsParams, Product, ProductInput};
use crate::AppState;

/// Query string of the product listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub category: Option<String>,
    pub paginate: Option<bool>,
    pub search: Option<String>,
    #[serde(default)]
    pub promo_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub items: Vec<Product>,
    #[serde(flatten)]
    pub summary: PageSummary,
}

/// GET /api/products - List products, then apply page-local filters.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<ProductListing> {
    let page = state
        .catalog
        .list_products(&ListProductsParams {
            page: query.page,
            page_size: query.page_size,
            category: query.category,
            enable_pagination: query.paginate,
        })
        .await?;

    let items = apply_filters(
        &page.items,
        &FilterOptions {
            search_term: query.search,
            promo_only: query.promo_only,
        },
    );
    let summary = PageSummary::new(&page, items.len());
    success(ProductListing { items, summary })
}

/// GET /api/products/:id - Get a single product.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    match state.catalog.get_product(&id).await? {
        Some(product) => success(product),
        None => Err(AppError::NotFound(format!("Product {} not found", id))),
    }
}

#[derive(Debug, Serialize)]
pub struct EnquiryLink {
    pub url: String,
}

/// GET /api/products/:id/whatsapp - Single-product enquiry link.
pub async fn product_enquiry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<EnquiryLink> {
    let product = state
        .catalog
        .get_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;
    let settings = state.settings.get_settings().await?;
    let number = require_number(settings.as_ref())?;

    success(EnquiryLink {
        url: product_link(&number, &product, &state.config.currency),
    })
}

/// GET /api/promotions - Products for the promotions carousel.
pub async fn list_promotions(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let all = state
        .catalog
        .list_products(&ListProductsParams {
            enable_pagination: Some(false),
            ..Default::default()
        })
        .await?;
    success(promotions(&all.items))
}

/// GET /api/categories - Categories currently used by products.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    success(state.catalog.categories().await?)
}

/// GET /api/categories/available - The configured category set.
pub async fn available_categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    success(state.catalog.available_categories().labels().to_vec())
}

/// POST /api/admin/products - Create a product.
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Product> {
    let product = state.mutations.create_product(input).await?;
    success_with_message(product, "Product added")
}

/// PUT /api/admin/products/:id - Replace a product.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Product> {
    let product = state.mutations.update_product(&id, input).await?;
    success_with_message(product, "Product updated")
}

/// DELETE /api/admin/products/:id - Delete a product.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.mutations.delete_product(&id).await?;
    success_with_message((), "Product deleted")
}
