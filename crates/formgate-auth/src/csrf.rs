//! Synchronizer-token CSRF protection.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use subtle::ConstantTimeEq;
use tracing::warn;

use formgate_core::error::AppError;
use formgate_core::result::AppResult;
use formgate_entity::session::SessionId;

use crate::session::SessionManager;

/// Session attribute holding the token.
pub const CSRF_TOKEN_ATTRIBUTE: &str = "csrf_token";

/// Issues and checks the per-session CSRF token.
#[derive(Debug, Clone)]
pub struct CsrfTokens {
    /// Session authority holding the tokens.
    sessions: Arc<SessionManager>,
}

impl CsrfTokens {
    /// Creates a token service over the session table.
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// The session's token, generated on first use.
    pub async fn token(&self, id: &SessionId) -> AppResult<String> {
        self.sessions
            .attribute_or_insert_with(id, CSRF_TOKEN_ATTRIBUTE, generate_token)
            .await
    }

    /// Drops the session's token so a fresh one is issued on next use.
    pub async fn clear(&self, id: &SessionId) -> AppResult<()> {
        self.sessions.take_attribute(id, CSRF_TOKEN_ATTRIBUTE).await?;
        Ok(())
    }

    /// Checks a presented token against the session's.
    ///
    /// Missing session, missing token, and mismatch all fail with
    /// `CsrfRejected`.
    pub async fn verify(&self, id: Option<&SessionId>, presented: Option<&str>) -> AppResult<()> {
        let Some(id) = id else {
            warn!("CSRF check failed: no session");
            return Err(AppError::csrf_rejected("Missing session for CSRF check"));
        };

        let expected = self
            .sessions
            .attribute(id, CSRF_TOKEN_ATTRIBUTE)
            .await
            .ok()
            .flatten();

        match (expected, presented) {
            (Some(expected), Some(presented))
                if bool::from(expected.as_bytes().ct_eq(presented.as_bytes())) =>
            {
                Ok(())
            }
            (None, _) => {
                warn!(session_id = %id, "CSRF check failed: no token issued");
                Err(AppError::csrf_rejected("Invalid CSRF token"))
            }
            _ => {
                warn!(session_id = %id, "CSRF check failed: token mismatch");
                Err(AppError::csrf_rejected("Invalid CSRF token"))
            }
        }
    }
}

/// Whether `method` is exempt from the token check.
pub fn is_safe_method(method: &str) -> bool {
    matches!(method, "GET" | "HEAD" | "OPTIONS" | "TRACE")
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
