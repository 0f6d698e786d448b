//! Video preview proxy.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::OEmbedQuery;
use crate::AppState;

/// GET /api/oembed?url= - Fetch video metadata server-side.
///
/// Always answers with permissive CORS headers so storefront pages on any origin can call it.
pub async fn oembed_preview(
    State(state): State<AppState>,
    Query(query): Query<OEmbedQuery>,
) -> Response {
    let result = match query.url.as_deref().map(str::trim) {
        None | Some("") => Err(AppError::BadRequest("Missing url parameter".to_string())),
        Some(url) => state.oembed.fetch_preview(url).await,
    };

    let mut response = match result {
        Ok(preview) => ApiResponse::new(preview).into_response(),
        Err(e) => e.into_response(),
    };
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET"),
    );
    response
}
