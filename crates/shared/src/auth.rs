//! Session claims carried in the signed session cookies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two kinds of signed-in principals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Office of Student Affairs administrator.
    Osas,
    /// Student organization (president account).
    Pres,
}

impl Role {
    /// Returns the lowercase role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Osas => "osas",
            Self::Pres => "pres",
        }
    }

    /// Name of the cookie that holds this role's session.
    #[must_use]
    pub const fn cookie_name(&self) -> &'static str {
        match self {
            Self::Osas => "osas_session",
            Self::Pres => "pres_session",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "osas" => Ok(Self::Osas),
            "pres" => Ok(Self::Pres),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Claims stored in a session token.
///
/// For OSAS sessions `sub` is the admin ID and `name` the admin username.
/// For PRES sessions `sub` is the organization ID and `name` the organization name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (admin or organization ID).
    pub sub: i64,
    /// Role of the subject.
    pub role: Role,
    /// Display name captured at sign-in.
    pub name: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl SessionClaims {
    /// Creates new claims.
    #[must_use]
    pub fn new(sub: i64, role: Role, name: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub,
            role,
            name: name.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the subject ID.
    #[must_use]
    pub const fn subject(&self) -> i64 {
        self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!("OSAS".parse::<Role>().unwrap(), Role::Osas);
        assert_eq!("pres".parse::<Role>().unwrap(), Role::Pres);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Pres.to_string(), "pres");
    }

    #[test]
    fn test_cookie_names_differ() {
        assert_ne!(Role::Osas.cookie_name(), Role::Pres.cookie_name());
    }
}
