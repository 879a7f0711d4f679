//! Storage error types.

use thiserror::Error;

/// Errors from validating or moving receipt and profile images.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Upload is bigger than the configured limit.
    #[error("image is {size} bytes; uploads are limited to {max} bytes")]
    TooLarge {
        /// Upload size.
        size: u64,
        /// Configured limit.
        max: u64,
    },

    /// Content type is not an accepted image type.
    #[error("only image uploads are accepted, got '{0}'")]
    NotAnImage(String),

    /// Filename extension is not an accepted image extension.
    #[error("file extension '{0}' is not allowed")]
    InvalidExtension(String),

    /// No object under this key.
    #[error("object not found: {key}")]
    NotFound {
        /// Object key.
        key: String,
    },

    /// The backend cannot sign a read link and no public base URL is set.
    #[error("storage backend cannot produce object links")]
    LinkUnavailable,

    /// Operator could not be built from the settings.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Any other backend failure.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Returns true for errors caused by the uploaded file itself.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::TooLarge { .. } | Self::NotAnImage(_) | Self::InvalidExtension(_)
        )
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            opendal::ErrorKind::Unsupported => Self::LinkUnavailable,
            _ => Self::Operation(err.to_string()),
        }
    }
}
