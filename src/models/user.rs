//! User model
//!
//! The user record the backend returns for `/current_user` and the admin
//! user listing. The `is_admin` flag is the single source of truth for
//! privileged UI: it must arrive as a real JSON boolean, and anything else
//! demotes the record to a regular user rather than guessing.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A registered user of the rental platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Role label reported by the backend
    #[serde(default)]
    pub role: UserRole,
    /// Administrator flag; gates the admin dashboard
    #[serde(default, deserialize_with = "strict_admin_flag")]
    pub is_admin: bool,
}

/// Decode `is_admin` strictly: only a JSON boolean counts.
///
/// The backend payload is untyped; a string `"true"` or a number must never
/// silently promote someone to admin. Malformed values are logged and read
/// as `false`.
fn strict_admin_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(flag) => Ok(flag),
        other => {
            tracing::warn!(
                value = %other,
                "non-boolean is_admin flag in user payload, treating as regular user"
            );
            Ok(false)
        }
    }
}

/// User role label.
///
/// The backend stores this as a free-form string next to `is_admin`; the
/// client only ever sees `user` and `admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular customer
    User,
    /// Administrator
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialize() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "username": "alice", "email": "a@x.com", "role": "user", "is_admin": false}"#,
        )
        .unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, UserRole::User);
        assert!(!user.is_admin);
    }

    #[test]
    fn test_admin_flag_true() {
        let user: User = serde_json::from_str(
            r#"{"id": 2, "username": "root", "email": "r@x.com", "role": "admin", "is_admin": true}"#,
        )
        .unwrap();

        assert!(user.is_admin);
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn test_admin_flag_missing_reads_as_false() {
        let user: User =
            serde_json::from_str(r#"{"id": 3, "username": "bob", "email": "b@x.com"}"#).unwrap();

        assert!(!user.is_admin);
        assert_eq!(user.role, UserRole::User);
    }

    #[test]
    fn test_admin_flag_malformed_reads_as_false() {
        // A stringly-typed flag must never grant admin
        let user: User = serde_json::from_str(
            r#"{"id": 4, "username": "eve", "email": "e@x.com", "is_admin": "true"}"#,
        )
        .unwrap();
        assert!(!user.is_admin);

        let user: User = serde_json::from_str(
            r#"{"id": 5, "username": "mallory", "email": "m@x.com", "is_admin": 1}"#,
        )
        .unwrap();
        assert!(!user.is_admin);
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::User.to_string(), "user");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("user").unwrap(), UserRole::User);
        assert!(UserRole::from_str("editor").is_err());
    }

    #[test]
    fn test_user_role_default() {
        assert_eq!(UserRole::default(), UserRole::User);
    }
}
