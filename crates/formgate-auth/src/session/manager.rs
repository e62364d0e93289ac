//! Session authority: issues, validates, rotates, and terminates sessions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use formgate_core::config::{OverflowStrategy, SessionConfig, SessionFixationPolicy};
use formgate_core::error::AppError;
use formgate_core::result::AppResult;
use formgate_core::types::SessionLimit;
use formgate_entity::session::{Principal, Session, SessionId, SessionState};

use super::store::{SessionStore, SessionTable};

/// Owns the session lifecycle `Created -> Active -> {Expired, LoggedOut, Evicted}`.
///
/// Every operation runs under the store's lock. Expiry is checked lazily
/// whenever a session is looked up and swept periodically by
/// [`super::SessionCleanup`].
#[derive(Clone)]
pub struct SessionManager {
    /// Session table.
    store: Arc<SessionStore>,
    /// Per-user cap on authenticated sessions.
    limit: SessionLimit,
    /// What to do when a login would exceed `limit`.
    overflow: OverflowStrategy,
    /// Identifier handling on successful authentication.
    fixation: SessionFixationPolicy,
    /// Inactivity after which a session expires.
    idle_timeout: Duration,
    /// Lifetime after which a session expires regardless of activity.
    absolute_timeout: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("limit", &self.limit)
            .field("overflow", &self.overflow)
            .field("fixation", &self.fixation)
            .field("idle_timeout", &self.idle_timeout)
            .field("absolute_timeout", &self.absolute_timeout)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager from session configuration.
    pub fn new(store: Arc<SessionStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            limit: SessionLimit::from(config.limits.max_sessions),
            overflow: config.limits.on_limit_exceeded,
            fixation: config.fixation,
            idle_timeout: seconds(config.idle_timeout_seconds),
            absolute_timeout: seconds(config.absolute_timeout_seconds),
        }
    }

    /// Issues an unauthenticated session for pre-login state.
    pub async fn create(&self) -> SessionId {
        let session = Session::new(Utc::now());
        let id = session.id.clone();
        self.store.lock().await.insert(session);
        debug!(session_id = %id, "Anonymous session created");
        id
    }

    /// Returns `current` if it is still live, otherwise a new anonymous session.
    ///
    /// The flag is `true` when a new session was issued.
    pub async fn ensure(&self, current: Option<&SessionId>) -> (SessionId, bool) {
        self.ensure_at(current, Utc::now()).await
    }

    pub(crate) async fn ensure_at(
        &self,
        current: Option<&SessionId>,
        now: DateTime<Utc>,
    ) -> (SessionId, bool) {
        let mut table = self.store.lock().await;

        if let Some(id) = current {
            if self.touch_mut(&mut table, id, now).is_ok() {
                return (id.clone(), false);
            }
        }

        let session = Session::new(now);
        let id = session.id.clone();
        table.insert(session);
        debug!(session_id = %id, "Anonymous session created");
        (id, true)
    }

    /// Logs `principal` in on a brand-new session.
    pub async fn login(&self, principal: Principal) -> AppResult<SessionId> {
        self.authenticate(None, principal).await
    }

    /// Binds `principal` to a session and returns the identifier to hand out.
    ///
    /// A live pre-login session in `current` is upgraded in place, subject to
    /// the fixation policy; otherwise a new session is issued. The cap counts
    /// the principal's other live sessions: with `Reject` the login fails
    /// with `SessionLimitExceeded` and nothing changes, with `EvictOldest`
    /// the oldest sessions are evicted to make room.
    pub async fn authenticate(
        &self,
        current: Option<&SessionId>,
        principal: Principal,
    ) -> AppResult<SessionId> {
        self.authenticate_at(current, principal, Utc::now()).await
    }

    pub(crate) async fn authenticate_at(
        &self,
        current: Option<&SessionId>,
        principal: Principal,
        now: DateTime<Utc>,
    ) -> AppResult<SessionId> {
        let mut table = self.store.lock().await;

        let current = match current {
            Some(id) => self
                .live_mut(&mut table, id, now)
                .ok()
                .map(|session| session.id.clone()),
            None => None,
        };

        let mut others = Vec::new();
        for id in table.user_sessions(&principal.username).to_vec() {
            if Some(&id) == current.as_ref() {
                continue;
            }
            if self.live_mut(&mut table, &id, now).is_ok() {
                others.push(id);
            }
        }

        if self.limit.is_reached_by(others.len()) {
            let max = self.limit.as_max().unwrap_or(u32::MAX);
            match self.overflow {
                OverflowStrategy::Reject => {
                    warn!(
                        user = %principal.username,
                        active = others.len(),
                        max_sessions = max,
                        "Login rejected: session limit reached"
                    );
                    return Err(AppError::session_limit_exceeded(max));
                }
                OverflowStrategy::EvictOldest => {
                    let excess = others.len() + 1 - max as usize;
                    for id in others.iter().take(excess) {
                        table.terminate(id, SessionState::Evicted, now);
                        info!(
                            user = %principal.username,
                            session_id = %id,
                            "Session evicted by newer login"
                        );
                    }
                }
            }
        }

        let mut session = current
            .and_then(|id| table.remove(&id))
            .unwrap_or_else(|| Session::new(now));
        let previous = session.id.clone();

        match self.fixation {
            SessionFixationPolicy::None => {}
            SessionFixationPolicy::ChangeSessionId => session.id = SessionId::generate(),
            SessionFixationPolicy::NewSession => {
                session.id = SessionId::generate();
                session.attributes.clear();
            }
        }

        session.state = SessionState::Active;
        session.principal = Some(principal);
        session.authenticated_at = Some(now);
        session.last_accessed_at = now;

        let id = session.id.clone();
        info!(
            user = session.username().unwrap_or_default(),
            session_id = %id,
            previous_session_id = %previous,
            fixation = ?self.fixation,
            "Session authenticated"
        );
        table.insert(session);

        Ok(id)
    }

    /// Issues a new identifier for a live session, carrying its data over.
    ///
    /// The old identifier stops validating immediately.
    pub async fn rotate_on_authentication(&self, id: &SessionId) -> AppResult<SessionId> {
        let now = Utc::now();
        let mut table = self.store.lock().await;

        self.live_mut(&mut table, id, now)?;
        let mut session = table
            .remove(id)
            .ok_or_else(|| AppError::invalid_session("Session not found"))?;

        session.id = SessionId::generate();
        let rotated = session.id.clone();
        table.insert(session);

        info!(session_id = %rotated, previous_session_id = %id, "Session identifier rotated");
        Ok(rotated)
    }

    /// Resolves an authenticated session to its principal and records the access.
    ///
    /// Unknown, terminated, expired, and unauthenticated sessions all fail
    /// with `InvalidSession`.
    pub async fn validate(&self, id: &SessionId) -> AppResult<Principal> {
        self.validate_at(id, Utc::now()).await
    }

    pub(crate) async fn validate_at(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> AppResult<Principal> {
        let mut table = self.store.lock().await;
        let session = self.live_mut(&mut table, id, now)?;

        if !session.is_authenticated() {
            return Err(AppError::invalid_session("Session is not authenticated"));
        }

        session.last_accessed_at = now;
        session
            .principal
            .clone()
            .ok_or_else(|| AppError::invalid_session("Session is not authenticated"))
    }

    /// Terminates a session. Idempotent.
    ///
    /// Returns `true` if a live session was logged out by this call.
    pub async fn logout(&self, id: &SessionId) -> bool {
        let now = Utc::now();
        let mut table = self.store.lock().await;

        let user = table
            .get(id)
            .and_then(|s| s.username())
            .map(str::to_string);

        if table.terminate(id, SessionState::LoggedOut, now) {
            info!(user = user.as_deref().unwrap_or("anonymous"), session_id = %id, "Logged out");
            true
        } else {
            debug!(session_id = %id, "Logout of unknown or terminated session ignored");
            false
        }
    }

    /// Reads a session attribute.
    pub async fn attribute(&self, id: &SessionId, key: &str) -> AppResult<Option<String>> {
        let mut table = self.store.lock().await;
        let session = self.touch_mut(&mut table, id, Utc::now())?;
        Ok(session.attributes.get(key).cloned())
    }

    /// Writes a session attribute.
    pub async fn set_attribute(
        &self,
        id: &SessionId,
        key: &str,
        value: impl Into<String>,
    ) -> AppResult<()> {
        let mut table = self.store.lock().await;
        let session = self.touch_mut(&mut table, id, Utc::now())?;
        session.attributes.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Reads a session attribute, initializing it first if absent.
    pub async fn attribute_or_insert_with(
        &self,
        id: &SessionId,
        key: &str,
        init: impl FnOnce() -> String,
    ) -> AppResult<String> {
        let mut table = self.store.lock().await;
        let session = self.touch_mut(&mut table, id, Utc::now())?;
        Ok(session
            .attributes
            .entry(key.to_string())
            .or_insert_with(init)
            .clone())
    }

    /// Removes and returns a session attribute.
    pub async fn take_attribute(&self, id: &SessionId, key: &str) -> AppResult<Option<String>> {
        let mut table = self.store.lock().await;
        let session = self.touch_mut(&mut table, id, Utc::now())?;
        Ok(session.attributes.remove(key))
    }

    /// Number of live authenticated sessions held by `username`.
    pub async fn active_sessions(&self, username: &str) -> usize {
        let now = Utc::now();
        let mut table = self.store.lock().await;

        let mut count = 0;
        for id in table.user_sessions(username).to_vec() {
            if self.live_mut(&mut table, &id, now).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Expires timed-out sessions and drops every terminated one.
    ///
    /// Returns the number of sessions removed from the table.
    pub async fn purge(&self) -> usize {
        self.purge_at(Utc::now()).await
    }

    pub(crate) async fn purge_at(&self, now: DateTime<Utc>) -> usize {
        let mut table = self.store.lock().await;
        let mut removed = 0;

        for id in table.ids() {
            let Some(session) = table.get(&id) else {
                continue;
            };

            let stale = session.state.is_terminal()
                || session.is_expired_at(now, self.idle_timeout, self.absolute_timeout);

            if stale {
                table.terminate(&id, SessionState::Expired, now);
                table.remove(&id);
                removed += 1;
            }
        }

        removed
    }

    /// Looks up a live session and records the access.
    fn touch_mut<'a>(
        &self,
        table: &'a mut SessionTable,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> AppResult<&'a mut Session> {
        let session = self.live_mut(table, id, now)?;
        session.last_accessed_at = now;
        Ok(session)
    }

    /// Looks up a live session, expiring it first if its time is up.
    fn live_mut<'a>(
        &self,
        table: &'a mut SessionTable,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> AppResult<&'a mut Session> {
        let expired = match table.get(id) {
            None => return Err(AppError::invalid_session("Session not found")),
            Some(session) if session.state.is_terminal() => {
                return Err(AppError::invalid_session(format!(
                    "Session is no longer valid ({:?})",
                    session.state
                )));
            }
            Some(session) => session.is_expired_at(now, self.idle_timeout, self.absolute_timeout),
        };

        if expired {
            table.terminate(id, SessionState::Expired, now);
            info!(session_id = %id, "Session expired");
            return Err(AppError::invalid_session("Session expired"));
        }

        table
            .get_mut(id)
            .ok_or_else(|| AppError::invalid_session("Session not found"))
    }
}

fn seconds(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}
