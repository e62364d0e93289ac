//! Unified application error types for FormGate.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input validation failed.
    Validation,
    /// Registration rejected because the username is taken.
    DuplicateUsername,
    /// Login rejected. Never says whether the username or the password was wrong.
    InvalidCredentials,
    /// Login rejected by the concurrent-session policy.
    SessionLimitExceeded,
    /// Missing, expired, unknown, or terminated session.
    InvalidSession,
    /// Authenticated, but the role does not satisfy the path requirement.
    AuthorizationDenied,
    /// A state-changing request did not carry the expected CSRF token.
    CsrfRejected,
    /// The requested resource was not found.
    NotFound,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether retrying the operation could succeed.
    ///
    /// Only storage failures are transient; uniqueness, credential, and
    /// authorization failures are terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Database)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::DuplicateUsername => write!(f, "DUPLICATE_USERNAME"),
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::SessionLimitExceeded => write!(f, "SESSION_LIMIT_EXCEEDED"),
            Self::InvalidSession => write!(f, "INVALID_SESSION"),
            Self::AuthorizationDenied => write!(f, "AUTHORIZATION_DENIED"),
            Self::CsrfRejected => write!(f, "CSRF_REJECTED"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout FormGate.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a duplicate-username error.
    pub fn duplicate_username(username: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateUsername,
            format!("Username '{username}' is already taken"),
        )
    }

    /// Create an invalid-credentials error with the one message used for
    /// every failed credential check.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid username or password")
    }

    /// Create a session-limit error.
    pub fn session_limit_exceeded(max_sessions: u32) -> Self {
        Self::new(
            ErrorKind::SessionLimitExceeded,
            format!(
                "Maximum concurrent sessions ({max_sessions}) reached. Please log out of another session first."
            ),
        )
    }

    /// Create an invalid-session error.
    pub fn invalid_session(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSession, message)
    }

    /// Create an authorization-denied error.
    pub fn authorization_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthorizationDenied, message)
    }

    /// Create a CSRF rejection.
    pub fn csrf_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CsrfRejected, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns `true` if this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::with_source(ErrorKind::Database, format!("Database error: {err}"), err)
    }
}
