//! Video preview metadata returned by the oEmbed proxy.

use serde::{Deserialize, Serialize};

/// Raw oEmbed document; only the fields the storefront renders.
#[derive(Debug, Clone, Deserialize)]
pub struct OEmbedDocument {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

/// Normalized preview handed to the storefront.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoPreview {
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    pub provider_name: Option<String>,
    pub html: Option<String>,
}

impl VideoPreview {
    pub fn from_document(video_url: &str, doc: OEmbedDocument) -> Self {
        let clean = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            video_url: video_url.to_string(),
            thumbnail_url: clean(doc.thumbnail_url),
            title: clean(doc.title),
            author_name: clean(doc.author_name),
            author_url: clean(doc.author_url),
            provider_name: clean(doc.provider_name),
            html: clean(doc.html),
        }
    }
}

/// Query string of the proxy endpoint.
#[derive(Debug, Deserialize)]
pub struct OEmbedQuery {
    #[serde(default)]
    pub url: Option<String>,
}
