//! Report document errors.

use thiserror::Error;

/// Errors raised while filling the report template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template is not a readable DOCX file.
    #[error("failed to read report template: {0}")]
    Read(String),

    /// The filled document could not be written.
    #[error("failed to write report document: {0}")]
    Write(String),

    /// A receipt image could not be decoded.
    #[error("invalid receipt image: {0}")]
    Image(String),
}
