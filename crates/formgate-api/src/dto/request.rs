//! Form bodies with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login form posted to the processing URL.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    #[serde(default)]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    #[serde(default)]
    pub password: String,
}

/// Registration form posted to `/joinProc`.
///
/// Only presence is checked here; length and character rules come from
/// the `auth` configuration and are enforced by the registration service.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JoinForm {
    /// Desired username.
    #[validate(length(min = 1, message = "Username is required"))]
    #[serde(default)]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    #[serde(default)]
    pub password: String,
}

/// Query string of the login page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPageQuery {
    /// Failure reason set by a failed login.
    pub error: Option<String>,
}
