//! Liquidation reports.
//!
//! This module provides pure business logic for per-wallet monthly reports:
//! - Report figures and the remaining-fund formula
//! - Report numbering and header text
//! - Submitting a pending snapshot into the archive

pub mod error;
pub mod numbering;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::SubmissionError;
pub use numbering::{
    academic_year_folders, college_name, folder_month, month_name, next_report_number,
    report_month_text,
};
pub use service::{ReportSubmissionService, SubmissionStore};
pub use types::*;
