//! Cart API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::models::{AddToCartRequest, CartView, CheckoutLink, SetQuantityRequest};
use crate::AppState;

/// GET /api/carts/:cart_id
pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> ApiResult<CartView> {
    success(state.carts.get(&cart_id).await?)
}

/// DELETE /api/carts/:cart_id - Empty the cart.
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> ApiResult<CartView> {
    success(state.carts.clear(&cart_id).await?)
}

/// POST /api/carts/:cart_id/items - Add one unit of a product.
pub async fn add_cart_item(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(request): Json<AddToCartRequest>,
) -> ApiResult<CartView> {
    success(state.carts.add(&cart_id, &request.product_id).await?)
}

/// PUT /api/carts/:cart_id/items/:product_id - Set a line quantity.
pub async fn set_cart_item_quantity(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
    Json(request): Json<SetQuantityRequest>,
) -> ApiResult<CartView> {
    success(
        state
            .carts
            .set_quantity(&cart_id, &product_id, request.quantity)
            .await?,
    )
}

/// DELETE /api/carts/:cart_id/items/:product_id
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
) -> ApiResult<CartView> {
    success(state.carts.remove(&cart_id, &product_id).await?)
}

/// POST /api/carts/:cart_id/checkout - WhatsApp order link; empties the cart.
pub async fn checkout_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> ApiResult<CheckoutLink> {
    success(state.carts.checkout(&cart_id).await?)
}
