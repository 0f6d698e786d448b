//! Server-side oEmbed lookups for presentation videos.

use std::time::Duration;

use crate::errors::AppError;
use crate::models::{OEmbedDocument, VideoPreview};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches video metadata from an oEmbed endpoint. Responses are not cached.
#[derive(Debug, Clone)]
pub struct OEmbedClient {
    http: reqwest::Client,
    endpoint: String,
}

impl OEmbedClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("storefront-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub async fn fetch_preview(&self, video_url: &str) -> Result<VideoPreview, AppError> {
        let video_url = video_url.trim();
        if video_url.is_empty() {
            return Err(AppError::BadRequest("Missing url parameter".to_string()));
        }

        tracing::debug!(%video_url, "Fetching oEmbed document");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("url", video_url)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %video_url, "oEmbed endpoint rejected the request");
            return Err(AppError::Upstream(format!(
                "oEmbed endpoint returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let document: OEmbedDocument = response.json().await?;
        Ok(VideoPreview::from_document(video_url, document))
    }
}
