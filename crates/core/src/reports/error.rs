//! Report error types.

use thiserror::Error;

/// Errors that can occur while submitting a report.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The wallet has no snapshot waiting to be submitted.
    #[error("No pending report")]
    NoPendingReport,

    /// The persistence layer failed.
    #[error("report store error: {0}")]
    Store(String),
}
