//! Blob upload endpoint.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap},
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::storage::{Bucket, StoredBlob};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// POST /api/admin/uploads/:bucket?filename= - Store the raw request body.
pub async fn upload_blob(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StoredBlob> {
    let bucket = Bucket::parse(&bucket)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    success(
        state
            .blobs
            .upload(bucket, query.filename.as_deref(), content_type, &body)
            .await?,
    )
}
