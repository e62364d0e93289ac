//! Registration input rules for usernames and passwords.

use formgate_core::config::AuthConfig;
use formgate_core::error::AppError;

/// Validates new credentials against the configured rules.
#[derive(Debug, Clone)]
pub struct CredentialValidator {
    /// Minimum password length, in characters.
    password_min_length: usize,
    /// Minimum username length, in characters.
    username_min_length: usize,
    /// Maximum username length, in characters.
    username_max_length: usize,
}

impl CredentialValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            password_min_length: config.password_min_length,
            username_min_length: config.username_min_length,
            username_max_length: config.username_max_length,
        }
    }

    /// Validates a username.
    ///
    /// Usernames are matched exactly at login, so surrounding whitespace is
    /// rejected rather than trimmed.
    pub fn validate_username(&self, username: &str) -> Result<(), AppError> {
        let length = username.chars().count();

        if length < self.username_min_length || length > self.username_max_length {
            return Err(AppError::validation(format!(
                "Username must be between {} and {} characters long",
                self.username_min_length, self.username_max_length
            )));
        }

        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(AppError::validation(
                "Username may only contain letters, digits, '_', '-' and '.'",
            ));
        }

        Ok(())
    }

    /// Validates a password.
    pub fn validate_password(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.password_min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.password_min_length
            )));
        }

        if password.trim().is_empty() {
            return Err(AppError::validation("Password must not be blank"));
        }

        Ok(())
    }

    /// Validates both fields, reporting the first violation.
    pub fn validate(&self, username: &str, password: &str) -> Result<(), AppError> {
        self.validate_username(username)?;
        self.validate_password(password)
    }
}

impl Default for CredentialValidator {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}
