//! REST API module.
//!
//! Contains all API routes and handlers of the storefront contract.

mod auth;
mod carts;
mod oembed;
mod products;
mod settings;
mod uploads;

pub use auth::*;
pub use carts::*;
pub use oembed::*;
pub use products::*;
pub use settings::*;
pub use uploads::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create a successful API response carrying a user-facing message.
pub fn success_with_message<T: Serialize>(data: T, message: impl Into<String>) -> ApiResult<T> {
    Ok(ApiResponse {
        message: Some(message.into()),
        ..ApiResponse::new(data)
    })
}
