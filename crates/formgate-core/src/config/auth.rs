//! Authentication and registration configuration.

use serde::{Deserialize, Serialize};

/// Credential and registration rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Minimum password length accepted at registration.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum username length.
    #[serde(default = "default_username_min")]
    pub username_min_length: usize,
    /// Maximum username length.
    #[serde(default = "default_username_max")]
    pub username_max_length: usize,
    /// Role assigned to newly registered users.
    #[serde(default = "default_role")]
    pub default_role: String,
    /// Accounts provisioned at startup, for deployments without registration.
    #[serde(default)]
    pub seed_users: Vec<SeedUserConfig>,
}

/// An account created at startup if its username is still free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUserConfig {
    /// Login name.
    pub username: String,
    /// Plaintext password, hashed before it is stored.
    pub password: String,
    /// Role tag, with or without the `ROLE_` prefix.
    pub role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_min_length: default_password_min(),
            username_min_length: default_username_min(),
            username_max_length: default_username_max(),
            default_role: default_role(),
            seed_users: Vec::new(),
        }
    }
}

fn default_password_min() -> usize {
    4
}

fn default_username_min() -> usize {
    3
}

fn default_username_max() -> usize {
    32
}

fn default_role() -> String {
    "USER".to_string()
}
