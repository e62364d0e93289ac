//! Session entity model.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use formgate_core::types::UserId;

use super::token::SessionId;
use crate::user::{Role, User};

/// An authenticated identity derived from a valid session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The user's identifier.
    pub user_id: UserId,
    /// The user's login name.
    pub username: String,
    /// The role held by the user.
    pub role: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
        }
    }
}

/// Lifecycle state of a session.
///
/// `Created -> Active -> {Expired, LoggedOut, Evicted}`; the last three are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Issued before authentication (holds only attributes).
    Created,
    /// Bound to an authenticated principal.
    Active,
    /// Idle or absolute timeout elapsed.
    Expired,
    /// Terminated by the user.
    LoggedOut,
    /// Terminated to make room for a newer login.
    Evicted,
}

impl SessionState {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::LoggedOut | Self::Evicted)
    }
}

/// An entry of the session table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Current identifier (changes on rotation).
    pub id: SessionId,
    /// Lifecycle state.
    pub state: SessionState,
    /// The authenticated owner, once logged in.
    pub principal: Option<Principal>,
    /// Free-form session attributes (saved request, CSRF token).
    pub attributes: HashMap<String, String>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last used.
    pub last_accessed_at: DateTime<Utc>,
    /// When the session was bound to its principal.
    pub authenticated_at: Option<DateTime<Utc>>,
    /// When the session reached a terminal state.
    pub terminated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates an unauthenticated session.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::generate(),
            state: SessionState::Created,
            principal: None,
            attributes: HashMap::new(),
            created_at: now,
            last_accessed_at: now,
            authenticated_at: None,
            terminated_at: None,
        }
    }

    /// Whether this session is bound to a live principal.
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Active && self.principal.is_some()
    }

    /// The owning username, if authenticated.
    pub fn username(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.username.as_str())
    }

    /// Whether the idle or absolute timeout has elapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, idle: Duration, absolute: Duration) -> bool {
        now - self.last_accessed_at > idle || now - self.created_at > absolute
    }

    /// Moves the session into a terminal state.
    pub fn terminate(&mut self, state: SessionState, now: DateTime<Utc>) {
        debug_assert!(state.is_terminal());
        self.state = state;
        self.terminated_at = Some(now);
        self.attributes.clear();
    }
}
