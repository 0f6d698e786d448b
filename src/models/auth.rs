//! Users, roles and sessions.

use serde::{Deserialize, Serialize};

/// A user as returned by credential verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Outcome of the role lookup for a user.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RoleStatus {
    Admin,
    Member,
    /// The role table has no rows for this user
    NoRoles,
}

impl RoleStatus {
    pub fn from_roles<S: AsRef<str>>(roles: &[S]) -> Self {
        if roles.is_empty() {
            RoleStatus::NoRoles
        } else if roles
            .iter()
            .any(|r| r.as_ref().trim().eq_ignore_ascii_case("admin"))
        {
            RoleStatus::Admin
        } else {
            RoleStatus::Member
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, RoleStatus::Admin)
    }
}

/// An authenticated session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub role: RoleStatus,
    pub created_at: String,
}

/// Request body for signing in.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}
