//! Shared types, errors, and configuration for Orgfin.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - Session claims and signed session tokens
//! - Email delivery
//! - Peso formatting for printed reports

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Role, SessionClaims};
pub use config::AppConfig;
pub use email::{EmailError, EmailService};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
