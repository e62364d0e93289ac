//! Role tag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use formgate_core::AppError;

/// Prefix accepted (and stripped) on role names, as in `ROLE_ADMIN`.
pub const ROLE_PREFIX: &str = "ROLE_";

/// A role tag such as `ADMIN`, `USER`, or `C`.
///
/// Roles are free-form tags; their relative privilege is defined only by
/// the configured role hierarchy. Names are normalized to upper case with
/// any `ROLE_` prefix removed, so `role_admin`, `ROLE_ADMIN`, and `admin`
/// are the same role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "String", into = "String")]
#[sqlx(transparent)]
pub struct Role(String);

impl Role {
    /// Parses and normalizes a role name.
    pub fn new(name: &str) -> Result<Self, AppError> {
        let upper = name.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix(ROLE_PREFIX).unwrap_or(&upper);

        if bare.is_empty() {
            return Err(AppError::validation("Role name must not be empty"));
        }

        if !bare
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::validation(format!(
                "Invalid role name: '{name}'. Use letters, digits, and underscores"
            )));
        }

        Ok(Self(bare.to_string()))
    }

    /// The bare role name, e.g. `ADMIN`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The role as a granted authority, e.g. `ROLE_ADMIN`.
    pub fn authority(&self) -> String {
        format!("{ROLE_PREFIX}{}", self.0)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Role {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}
