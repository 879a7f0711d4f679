//! Object storage for receipt images and profile pictures using Apache OpenDAL.
//!
//! Supported backends:
//! - S3-compatible: Supabase Storage, Cloudflare R2, AWS S3
//! - Local filesystem (development only)
//!
//! # Layout
//!
//! ```text
//! Receipts/
//! ├── {org-slug}/{wallet-slug}/{month-slug}/{uuid}.{ext}   receipt images
//! └── profile-pictures/{org_id}/{uuid}.{ext}              profile pictures
//! ```

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{PROFILE_PICTURE_EXTENSIONS, StorageService, slugify};
