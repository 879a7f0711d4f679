//! Generated login credentials for new organizations.

use rand::{Rng, distr::Alphanumeric};

/// Prefix of generated organization usernames.
pub const USERNAME_PREFIX: &str = "0125";

/// Length of generated passwords when none is requested.
pub const DEFAULT_GENERATED_PASSWORD_LENGTH: usize = 8;

/// Generates a username of the form `0125-NNNN`.
#[must_use]
pub fn generate_username() -> String {
    let suffix: u16 = rand::rng().random_range(1000..=9999);
    format!("{USERNAME_PREFIX}-{suffix}")
}

/// Generates a random alphanumeric password.
#[must_use]
pub fn generate_password(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_username_shape() {
        for _ in 0..100 {
            let username = generate_username();
            let (prefix, digits) = username.split_once('-').unwrap();
            assert_eq!(prefix, USERNAME_PREFIX);
            let n: u16 = digits.parse().unwrap();
            assert!((1000..=9999).contains(&n));
        }
    }

    #[test]
    fn test_generated_password_shape() {
        let password = generate_password(DEFAULT_GENERATED_PASSWORD_LENGTH);
        assert_eq!(password.len(), 8);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(generate_password(0), "");
    }
}
