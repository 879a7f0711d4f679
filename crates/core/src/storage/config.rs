//! Storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Supabase Storage, Cloudflare R2, AWS S3
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
        /// Logical bucket name used in public URLs.
        bucket: String,
    },
}

impl StorageProvider {
    /// Create S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self::LocalFs {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } | Self::LocalFs { bucket, .. } => bucket,
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Presigned download URL TTL in seconds (default: 3600 = 1 hour).
    pub presign_download_ttl_secs: u64,
    /// Allowed MIME types for upload.
    pub allowed_mime_types: Vec<String>,
    /// Base URL of the public object endpoint. Without it, links are presigned.
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    /// Default download TTL: 1 hour.
    pub const DEFAULT_DOWNLOAD_TTL: u64 = 3600;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            presign_download_ttl_secs: Self::DEFAULT_DOWNLOAD_TTL,
            allowed_mime_types: Self::default_mime_types(),
            public_base_url: None,
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set the public object endpoint.
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Image types accepted for receipts and profile pictures.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        ["image/png", "image/jpeg", "image/gif", "image/webp"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Check if a MIME type is allowed.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|t| t == mime_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_provider_s3() {
        let provider = StorageProvider::s3(
            "https://xyz.supabase.co/storage/v1/s3",
            "Receipts",
            "access_key",
            "secret_key",
            "ap-southeast-1",
        );
        assert_eq!(provider.name(), "s3");
        assert_eq!(provider.bucket(), "Receipts");
    }

    #[test]
    fn test_storage_provider_local() {
        let provider = StorageProvider::local_fs("./storage", "Receipts");
        assert_eq!(provider.name(), "local");
        assert_eq!(provider.bucket(), "Receipts");
    }

    #[test]
    fn test_mime_type_validation() {
        let config = StorageConfig::new(StorageProvider::local_fs("./storage", "Receipts"));
        assert!(config.is_mime_type_allowed("image/png"));
        assert!(config.is_mime_type_allowed("image/jpeg"));
        assert!(!config.is_mime_type_allowed("application/pdf"));
        assert!(!config.is_mime_type_allowed("text/html"));
        assert!(config.public_base_url.is_none());
    }
}
