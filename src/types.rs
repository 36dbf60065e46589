//! Core types for the a3s-users service
//!
//! All types use camelCase JSON serialization for wire compatibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Positive identifier, assigned once and never reused
    pub id: u64,

    pub name: String,

    pub email: String,

    /// Set at creation, immutable thereafter
    pub created_at: DateTime<Utc>,

    /// Present only after the first update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/users`
///
/// Both fields are optional at the wire level so that a missing field is
/// reported as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `PUT /api/users/:id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Response of `GET /api/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub count: usize,
}

impl From<Vec<User>> for UserList {
    fn from(users: Vec<User>) -> Self {
        let count = users.len();
        Self { users, count }
    }
}

/// Static build metadata served by `GET /api/version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: String,
    pub build_time: String,
    pub git_commit: String,
}
