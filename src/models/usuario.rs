//! User model
//!
//! Defines the `User` entity and its role enum. Passwords only ever appear
//! in request payloads (see the client module); they are never part of the
//! model and never stored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity for the current session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// User role
    pub role: UserRole,
    /// Avatar URL (optional)
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// User role for authorization.
///
/// The API speaks Spanish: non-admin users carry the role `usuario`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    /// Administrator - can manage news
    #[serde(rename = "admin")]
    Admin,
    /// Regular user
    #[serde(rename = "usuario")]
    Regular,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Regular
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Regular => write!(f, "usuario"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "usuario" => Ok(UserRole::Regular),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}
