//! Authentication helpers.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - The password policy enforced on organization password changes
//! - Generated usernames and passwords for new organizations

mod credentials;
mod password;

pub use credentials::{
    DEFAULT_GENERATED_PASSWORD_LENGTH, USERNAME_PREFIX, generate_password, generate_username,
};
pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, hash_password, validate_password_policy, verify_password,
};
