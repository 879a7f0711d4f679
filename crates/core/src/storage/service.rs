//! Storage service implementation using Apache OpenDAL.

use std::time::Duration;

use opendal::{Operator, services};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Extensions accepted for profile pictures.
pub const PROFILE_PICTURE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Storage service for receipt images and profile pictures.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("provider", &self.config.provider.name())
            .field("bucket", &self.config.provider.bucket())
            .finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root, .. } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Validate an upload against size and MIME type limits.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::TooLarge {
                size,
                max: self.config.max_file_size,
            });
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::NotAnImage(content_type.to_string()));
        }

        Ok(())
    }

    /// Storage key for a receipt image.
    ///
    /// Format: `{org}/{wallet}/{month}/{uuid}{ext}` with slugged folder names.
    /// The extension comes from the uploaded filename and defaults to `.png`.
    #[must_use]
    pub fn receipt_key(org_name: &str, wallet_name: &str, month_name: &str, filename: &str) -> String {
        let ext = file_extension(filename).map_or_else(|| ".png".to_string(), |e| format!(".{e}"));
        format!(
            "{}/{}/{}/{}{ext}",
            slugify(org_name),
            slugify(wallet_name),
            slugify(month_name),
            Uuid::new_v4()
        )
    }

    /// Storage key for an organization's profile picture.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidExtension` unless the file is png, jpg, jpeg or gif.
    pub fn profile_picture_key(organization_id: i64, filename: &str) -> Result<String, StorageError> {
        let ext = file_extension(filename)
            .filter(|e| PROFILE_PICTURE_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| StorageError::InvalidExtension(filename.to_string()))?;
        Ok(format!("profile-pictures/{organization_id}/{}.{ext}", Uuid::new_v4()))
    }

    /// Store an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.operator.info().full_capability().write_with_content_type {
            self.operator
                .write_with(key, bytes)
                .content_type(content_type)
                .await
                .map_err(StorageError::from)?;
        } else {
            self.operator
                .write(key, bytes)
                .await
                .map_err(StorageError::from)?;
        }
        Ok(())
    }

    /// Read an object.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the object does not exist.
    pub async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let buffer = self.operator.read(key).await.map_err(StorageError::from)?;
        Ok(buffer.to_vec())
    }

    /// Delete an object.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Link to an object.
    ///
    /// With a public base URL this is the bucket's public object URL
    /// (`?download=` asks the browser to save it). Otherwise a presigned
    /// read URL is generated.
    ///
    /// # Errors
    ///
    /// Returns an error if presigning is not supported or fails.
    pub async fn object_url(&self, key: &str, download: bool) -> Result<String, StorageError> {
        if let Some(url) = self.public_url(key, download) {
            return Ok(url);
        }

        let ttl = Duration::from_secs(self.config.presign_download_ttl_secs);
        let presigned = self
            .operator
            .presign_read(key, ttl)
            .await
            .map_err(StorageError::from)?;
        Ok(presigned.uri().to_string())
    }

    /// Public object URL, when a public base URL is configured.
    #[must_use]
    pub fn public_url(&self, key: &str, download: bool) -> Option<String> {
        let base = self.config.public_base_url.as_deref()?;
        let mut url = format!(
            "{}/storage/v1/object/public/{}/{}",
            base.trim_end_matches('/'),
            self.bucket(),
            key.trim_start_matches('/')
        );
        if download {
            url.push_str("?download=");
        }
        Some(url)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Lowercased extension of a filename, without the dot.
fn file_extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// URL-safe folder name: lowercase ASCII letters and digits separated by single hyphens.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn local_service() -> StorageService {
        StorageService::from_config(StorageConfig::new(StorageProvider::local_fs(
            std::env::temp_dir().join("orgfin-storage-tests"),
            "Receipts",
        )))
        .expect("should create service")
    }

    #[rstest]
    #[case("Math Society", "math-society")]
    #[case("  Junior  Philippine Institute of Accountants ", "junior-philippine-institute-of-accountants")]
    #[case("CCS_Student-Council!!", "ccs-student-council")]
    #[case("September", "september")]
    #[case("Año 2025", "a-o-2025")]
    #[case("***", "untitled")]
    fn test_slugify(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn test_receipt_key_layout() {
        let key = StorageService::receipt_key("Math Society", "General Fund", "August", "IMG_01.JPG");
        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(&parts[..3], ["math-society", "general-fund", "august"]);
        let (id, ext) = parts[3].split_once('.').unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn test_receipt_key_defaults_to_png() {
        let key = StorageService::receipt_key("Org", "Wallet", "May", "blob");
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn test_profile_picture_key() {
        let key = StorageService::profile_picture_key(12, "me.JPEG").unwrap();
        assert!(key.starts_with("profile-pictures/12/"));
        assert!(key.ends_with(".jpeg"));

        let err = StorageService::profile_picture_key(12, "me.svg").unwrap_err();
        assert!(matches!(err, StorageError::InvalidExtension(_)));
        assert!(err.is_client_error());
        assert!(StorageService::profile_picture_key(12, "noext").is_err());
    }

    #[test]
    fn test_validate_upload() {
        let config = StorageConfig::new(StorageProvider::local_fs("./test", "Receipts"))
            .with_max_file_size(1024);
        let service = StorageService::from_config(config).expect("should create service");

        assert!(service.validate_upload("image/png", 512).is_ok());
        assert!(matches!(
            service.validate_upload("image/png", 2048),
            Err(StorageError::TooLarge { .. })
        ));
        assert!(matches!(
            service.validate_upload("application/x-executable", 10),
            Err(StorageError::NotAnImage(_))
        ));

        let err = service.validate_upload("image/png", 2048).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "image is 2048 bytes; uploads are limited to 1024 bytes"
        );
    }

    #[test]
    fn test_public_url() {
        let config = StorageConfig::new(StorageProvider::local_fs("./test", "Receipts"))
            .with_public_base_url("https://xyz.supabase.co/");
        let service = StorageService::from_config(config).expect("should create service");

        assert_eq!(
            service.public_url("org/wallet/may/a.png", false).unwrap(),
            "https://xyz.supabase.co/storage/v1/object/public/Receipts/org/wallet/may/a.png"
        );
        assert!(
            service
                .public_url("org/wallet/may/a.png", true)
                .unwrap()
                .ends_with("a.png?download=")
        );
        assert!(local_service().public_url("a.png", false).is_none());
    }

    #[tokio::test]
    async fn test_local_round_trip() {
        let service = local_service();
        let key = StorageService::receipt_key("Test Org", "Wallet", "June", "r.png");

        service
            .upload(&key, b"fake image".to_vec(), "image/png")
            .await
            .unwrap();
        assert_eq!(service.download(&key).await.unwrap(), b"fake image");

        service.delete(&key).await.unwrap();
        assert!(matches!(
            service.download(&key).await,
            Err(StorageError::NotFound { .. })
        ));
    }
}
