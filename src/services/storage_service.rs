use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::{ServiceError, ServiceResult};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct BlobMetadata {
    pub file_name: String,
    pub content_type: String,
}

/// Persists uploaded bytes and hands back an opaque handle for the article row.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(&self, bytes: Vec<u8>, metadata: BlobMetadata) -> ServiceResult<String>;
}

pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn check(bytes: &[u8], metadata: &BlobMetadata) -> ServiceResult<()> {
        if bytes.is_empty() {
            return Err(ServiceError::bad_request("MEDIA_EMPTY", "Uploaded file is empty"));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ServiceError::bad_request("MEDIA_TOO_LARGE", "File size exceeds 5MB"));
        }
        if !metadata.content_type.starts_with("image/") {
            return Err(ServiceError::bad_request("MEDIA_INVALID_TYPE", "Only images are supported"));
        }
        Ok(())
    }

    fn extension(metadata: &BlobMetadata) -> String {
        let from_name = std::path::Path::new(&metadata.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        from_name.unwrap_or_else(|| {
            match metadata.content_type.trim_start_matches("image/") {
                "jpeg" => "jpg".to_string(),
                "svg+xml" => "svg".to_string(),
                other if !other.is_empty() && other.chars().all(|c| c.is_ascii_alphanumeric()) => {
                    other.to_string()
                }
                _ => "bin".to_string(),
            }
        })
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, bytes: Vec<u8>, metadata: BlobMetadata) -> ServiceResult<String> {
        Self::check(&bytes, &metadata)?;

        let handle = format!("{}.{}", Uuid::now_v7(), Self::extension(&metadata));
        let target = self.root.join(&handle);

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            tracing::error!("Failed to prepare upload dir {:?}: {}", self.root, e);
            ServiceError::Internal(e.to_string())
        })?;
        tokio::fs::write(&target, &bytes).await.map_err(|e| {
            tracing::error!("Failed to write {:?}: {}", target, e);
            ServiceError::Internal(e.to_string())
        })?;

        tracing::info!("Stored blob {} ({} bytes)", handle, bytes.len());
        Ok(handle)
    }
}
