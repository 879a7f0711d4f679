//! Core business logic for Orgfin.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Domain types, validation rules and calculations live here.
//!
//! # Modules
//!
//! - `auth` - Password hashing, password policy and generated credentials
//! - `checklist` - Monthly submission checklist and master report status
//! - `dashboard` - Organization dashboard figures
//! - `reports` - Report figures, numbering and submission
//! - `document` - Filling the DOCX report template
//! - `storage` - Receipt and profile picture storage

pub mod auth;
pub mod checklist;
pub mod dashboard;
pub mod document;
pub mod reports;
pub mod storage;
