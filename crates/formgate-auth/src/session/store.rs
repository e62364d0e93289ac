//! In-memory session table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use formgate_entity::session::{Session, SessionId, SessionState};

/// Sessions by identifier, plus an index of each user's authenticated
/// sessions in login order.
///
/// Terminated sessions stay in the table as tombstones until the next
/// cleanup sweep; they are never revalidated.
#[derive(Debug, Default)]
pub struct SessionTable {
    /// All sessions, live and terminated.
    sessions: HashMap<SessionId, Session>,
    /// Username to authenticated, non-terminated sessions (oldest first).
    by_user: HashMap<String, Vec<SessionId>>,
}

impl SessionTable {
    /// Looks up a session by identifier.
    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Looks up a session for modification.
    ///
    /// Callers must not change `id`, `state`, or `principal` through this
    /// reference; use [`SessionTable::remove`] and [`SessionTable::insert`].
    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Inserts a session, indexing it under its owner if authenticated.
    pub fn insert(&mut self, session: Session) {
        if session.is_authenticated() {
            if let Some(username) = session.username() {
                self.by_user
                    .entry(username.to_string())
                    .or_default()
                    .push(session.id.clone());
            }
        }
        self.sessions.insert(session.id.clone(), session);
    }

    /// Removes a session entirely.
    pub fn remove(&mut self, id: &SessionId) -> Option<Session> {
        let session = self.sessions.remove(id)?;
        self.unindex(&session);
        Some(session)
    }

    /// Moves a live session into a terminal state, keeping a tombstone.
    ///
    /// Returns `false` if the session is unknown or already terminated.
    pub fn terminate(&mut self, id: &SessionId, state: SessionState, now: DateTime<Utc>) -> bool {
        let Some(session) = self.sessions.get_mut(id) else {
            return false;
        };
        if session.state.is_terminal() {
            return false;
        }

        session.terminate(state, now);
        let username = session.username().map(str::to_string);
        if let Some(username) = username {
            self.unindex_id(&username, id);
        }
        true
    }

    /// Authenticated, non-terminated sessions of a user, oldest login first.
    ///
    /// Entries may have passed their idle timeout without being marked yet.
    pub fn user_sessions(&self, username: &str) -> &[SessionId] {
        self.by_user
            .get(username)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All session identifiers, for sweeping.
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.keys().cloned().collect()
    }

    /// Number of sessions in the table, tombstones included.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn unindex(&mut self, session: &Session) {
        if let Some(username) = session.username() {
            self.unindex_id(username, &session.id);
        }
    }

    fn unindex_id(&mut self, username: &str, id: &SessionId) {
        if let Some(ids) = self.by_user.get_mut(username) {
            ids.retain(|other| other != id);
            if ids.is_empty() {
                self.by_user.remove(username);
            }
        }
    }
}

/// Shared session table guarded by a single async mutex.
///
/// Every login, validation, and logout takes the same lock, so the
/// concurrent-session cap is exact under concurrent logins.
#[derive(Debug, Default)]
pub struct SessionStore {
    /// Protected table.
    table: Mutex<SessionTable>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the table for one atomic operation.
    pub async fn lock(&self) -> MutexGuard<'_, SessionTable> {
        self.table.lock().await
    }
}
