//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field has a default, so an empty file is a valid
//! configuration that reproduces the deployed behaviour.

pub mod app;
pub mod auth;
pub mod authorization;
pub mod database;
pub mod logging;
pub mod security;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::{AuthConfig, SeedUserConfig};
pub use self::authorization::{AccessRule, AuthorizationConfig, PathRuleConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::security::{CsrfConfig, FormLoginConfig, LogoutConfig, SecurityConfig};
pub use self::session::{
    OverflowStrategy, SessionConfig, SessionCookieConfig, SessionFixationPolicy,
    SessionLimitsConfig,
};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Credential store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Registration and credential rules.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session management settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Login, logout, and CSRF settings.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Path rules and role hierarchy.
    #[serde(default)]
    pub authorization: AuthorizationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `FORMGATE`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FORMGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_deployed_defaults() {
        let config = AppConfig::from_toml("").expect("empty config parses");
        assert_eq!(config.session.limits.max_sessions, 1);
        assert_eq!(
            config.session.limits.on_limit_exceeded,
            OverflowStrategy::Reject
        );
        assert_eq!(config.session.fixation, SessionFixationPolicy::ChangeSessionId);
        assert_eq!(config.security.form_login.login_page, "/login");
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_overrides_from_toml() {
        let config = AppConfig::from_toml(
            r#"
            [session]
            idle_timeout_seconds = 60

            [session.limits]
            max_sessions = 2
            on_limit_exceeded = "evict_oldest"

            [[authorization.rules]]
            patterns = ["/manager"]
            access = { has_role = "B" }
            "#,
        )
        .expect("config parses");

        assert_eq!(config.session.idle_timeout_seconds, 60);
        assert_eq!(config.session.limits.max_sessions, 2);
        assert_eq!(
            config.session.limits.on_limit_exceeded,
            OverflowStrategy::EvictOldest
        );
        assert_eq!(config.authorization.rules.len(), 1);
        assert_eq!(
            config.authorization.rules[0].access,
            AccessRule::HasRole("B".to_string())
        );
    }
}
