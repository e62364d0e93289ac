//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle timeout in seconds before a session expires.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Absolute session lifetime in seconds (regardless of activity).
    #[serde(default = "default_absolute_timeout")]
    pub absolute_timeout_seconds: u64,
    /// Interval for the expired-session sweep in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
    /// Concurrent session limits.
    #[serde(default)]
    pub limits: SessionLimitsConfig,
    /// What happens to the session identifier on successful login.
    #[serde(default)]
    pub fixation: SessionFixationPolicy,
    /// Session cookie settings.
    #[serde(default)]
    pub cookie: SessionCookieConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: default_idle_timeout(),
            absolute_timeout_seconds: default_absolute_timeout(),
            cleanup_interval_seconds: default_cleanup_interval(),
            limits: SessionLimitsConfig::default(),
            fixation: SessionFixationPolicy::default(),
            cookie: SessionCookieConfig::default(),
        }
    }
}

/// Concurrent session limits configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLimitsConfig {
    /// Maximum authenticated sessions per user. `0` means unlimited.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u32,
    /// Strategy applied when a login would exceed `max_sessions`.
    #[serde(default)]
    pub on_limit_exceeded: OverflowStrategy,
}

impl Default for SessionLimitsConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            on_limit_exceeded: OverflowStrategy::default(),
        }
    }
}

/// Strategy applied when a user tries to exceed their session limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowStrategy {
    /// Refuse the new login; existing sessions stay valid.
    #[default]
    Reject,
    /// Evict the oldest existing session to make room.
    EvictOldest,
}

impl std::fmt::Display for OverflowStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverflowStrategy::Reject => write!(f, "reject"),
            OverflowStrategy::EvictOldest => write!(f, "evict_oldest"),
        }
    }
}

/// Session-fixation protection applied on successful authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionFixationPolicy {
    /// Keep the pre-login identifier. Vulnerable to fixation.
    None,
    /// Issue a new identifier, carrying over the session attributes.
    #[default]
    ChangeSessionId,
    /// Issue a new identifier and drop the pre-login attributes.
    NewSession,
}

/// Session cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCookieConfig {
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,
    /// Cookie path.
    #[serde(default = "default_cookie_path")]
    pub path: String,
    /// Whether the cookie is marked `Secure`.
    #[serde(default)]
    pub secure: bool,
    /// Whether the cookie is marked `HttpOnly`.
    #[serde(default = "default_true")]
    pub http_only: bool,
    /// `SameSite` attribute: `"strict"`, `"lax"`, or `"none"`.
    #[serde(default = "default_same_site")]
    pub same_site: String,
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            path: default_cookie_path(),
            secure: false,
            http_only: true,
            same_site: default_same_site(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    30 * 60
}

fn default_absolute_timeout() -> u64 {
    12 * 60 * 60
}

fn default_cleanup_interval() -> u64 {
    5 * 60
}

fn default_max_sessions() -> u32 {
    1
}

fn default_cookie_name() -> String {
    "SESSION".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_same_site() -> String {
    "lax".to_string()
}

fn default_true() -> bool {
    true
}
