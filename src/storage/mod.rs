//! Public blob buckets for product images, logos and presentation videos.

use std::path::PathBuf;

use serde::Serialize;

use crate::errors::AppError;

const MIB: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    ProductImages,
    Logos,
    Videos,
}

impl Bucket {
    pub fn parse(name: &str) -> Result<Self, AppError> {
        match name {
            "product-images" => Ok(Bucket::ProductImages),
            "logos" => Ok(Bucket::Logos),
            "videos" => Ok(Bucket::Videos),
            other => Err(AppError::NotFound(format!("Unknown bucket: {}", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::ProductImages => "product-images",
            Bucket::Logos => "logos",
            Bucket::Videos => "videos",
        }
    }

    fn accepted_type(&self) -> &'static str {
        match self {
            Bucket::ProductImages | Bucket::Logos => "image/",
            Bucket::Videos => "video/",
        }
    }

    pub fn max_bytes(&self) -> usize {
        match self {
            Bucket::ProductImages | Bucket::Logos => 5 * MIB,
            Bucket::Videos => 10 * MIB,
        }
    }

    pub fn all() -> [Bucket; 3] {
        [Bucket::ProductImages, Bucket::Logos, Bucket::Videos]
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlob {
    pub bucket: String,
    pub key: String,
    pub public_url: String,
    pub size: usize,
}

/// Lowercase alphanumeric extension from the file name, else from the content subtype.
fn extension_for(filename: Option<&str>, content_type: &str) -> String {
    let clean = |s: &str| {
        let ext: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(10)
            .collect::<String>()
            .to_ascii_lowercase();
        Some(ext).filter(|e| !e.is_empty())
    };

    filename
        .and_then(|name| name.rsplit_once('.'))
        .and_then(|(_, ext)| clean(ext))
        .or_else(|| {
            content_type
                .split(';')
                .next()
                .and_then(|t| t.split_once('/'))
                .and_then(|(_, sub)| clean(sub))
        })
        .unwrap_or_else(|| "bin".to_string())
}

/// `{unix_millis}-{7 random chars}.{ext}`
fn blob_key(ext: &str) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        &random[..7],
        ext
    )
}

/// Directory-backed blob store served under `/storage`.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Create every bucket directory.
    pub async fn ensure_buckets(&self) -> Result<(), AppError> {
        for bucket in Bucket::all() {
            tokio::fs::create_dir_all(self.root.join(bucket.as_str())).await?;
        }
        Ok(())
    }

    pub fn public_url(&self, bucket: Bucket, key: &str) -> String {
        format!("{}/storage/{}/{}", self.public_base_url, bucket.as_str(), key)
    }

    pub async fn upload(
        &self,
        bucket: Bucket,
        filename: Option<&str>,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredBlob, AppError> {
        if !content_type.starts_with(bucket.accepted_type()) {
            return Err(AppError::validation(
                "contentType",
                format!(
                    "Bucket {} only accepts {}* files (got {:?})",
                    bucket.as_str(),
                    bucket.accepted_type(),
                    content_type
                ),
            ));
        }
        if bytes.is_empty() {
            return Err(AppError::validation("file", "File is empty"));
        }
        if bytes.len() > bucket.max_bytes() {
            return Err(AppError::validation(
                "file",
                format!(
                    "File exceeds the {} MiB limit of bucket {}",
                    bucket.max_bytes() / MIB,
                    bucket.as_str()
                ),
            ));
        }

        let key = blob_key(&extension_for(filename, content_type));
        let dir = self.root.join(bucket.as_str());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&key), bytes).await?;

        tracing::info!(bucket = bucket.as_str(), %key, size = bytes.len(), "Stored blob");
        Ok(StoredBlob {
            bucket: bucket.as_str().to_string(),
            public_url: self.public_url(bucket, &key),
            key,
            size: bytes.len(),
        })
    }
}
