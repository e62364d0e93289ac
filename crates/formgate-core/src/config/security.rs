//! Form login, logout, and CSRF configuration.

use serde::{Deserialize, Serialize};

/// Web security endpoints and CSRF settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Form login settings.
    #[serde(default)]
    pub form_login: FormLoginConfig,
    /// Logout settings.
    #[serde(default)]
    pub logout: LogoutConfig,
    /// CSRF protection settings.
    #[serde(default)]
    pub csrf: CsrfConfig,
}

/// Form login endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormLoginConfig {
    /// Where unauthenticated browsers are redirected.
    #[serde(default = "default_login_page")]
    pub login_page: String,
    /// Where the login form is posted.
    #[serde(default = "default_processing_url")]
    pub processing_url: String,
    /// Redirect target after login when no request was saved.
    #[serde(default = "default_success_url")]
    pub default_success_url: String,
    /// Redirect target after a failed login. A `=reason` suffix is appended.
    #[serde(default = "default_failure_url")]
    pub failure_url: String,
}

impl Default for FormLoginConfig {
    fn default() -> Self {
        Self {
            login_page: default_login_page(),
            processing_url: default_processing_url(),
            default_success_url: default_success_url(),
            failure_url: default_failure_url(),
        }
    }
}

/// Logout endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutConfig {
    /// Logout URL (served on GET).
    #[serde(default = "default_logout_url")]
    pub url: String,
    /// Redirect target after logout.
    #[serde(default = "default_success_url")]
    pub success_url: String,
}

impl Default for LogoutConfig {
    fn default() -> Self {
        Self {
            url: default_logout_url(),
            success_url: default_success_url(),
        }
    }
}

/// Synchronizer-token CSRF protection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfConfig {
    /// Whether state-changing requests must carry the session's token.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Header carrying the token.
    #[serde(default = "default_header_name")]
    pub header_name: String,
    /// Form field carrying the token.
    #[serde(default = "default_parameter_name")]
    pub parameter_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            header_name: default_header_name(),
            parameter_name: default_parameter_name(),
        }
    }
}

fn default_login_page() -> String {
    "/login".to_string()
}

fn default_processing_url() -> String {
    "/loginProc".to_string()
}

fn default_success_url() -> String {
    "/".to_string()
}

fn default_failure_url() -> String {
    "/login?error".to_string()
}

fn default_logout_url() -> String {
    "/logout".to_string()
}

fn default_header_name() -> String {
    "X-CSRF-TOKEN".to_string()
}

fn default_parameter_name() -> String {
    "_csrf".to_string()
}

fn default_true() -> bool {
    true
}
