//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use formgate_core::types::UserId;

use super::role::Role;

/// A registered user.
///
/// Users are created by registration and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique, immutable login name.
    pub username: String,
    /// Salted one-way password hash (PHC string).
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// The single role tag held by this user.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
}

impl CreateUser {
    /// Materializes the record with a fresh identifier and creation time.
    pub fn into_user(self) -> User {
        User {
            id: UserId::new(),
            username: self.username,
            password_hash: self.password_hash,
            role: self.role,
            created_at: Utc::now(),
        }
    }
}
