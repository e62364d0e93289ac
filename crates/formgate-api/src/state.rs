//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use formgate_auth::{
    AuthorizationPolicy, CredentialAuthenticator, CsrfTokens, Gatekeeper, PasswordHasher,
    RegistrationService, SessionManager, SessionStore,
};
use formgate_core::config::AppConfig;
use formgate_core::result::AppResult;
use formgate_database::repositories::UserRepository;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Persistence ──────────────────────────────────────────
    /// Credential store
    pub users: Arc<dyn UserRepository>,

    // ── Auth ─────────────────────────────────────────────────
    /// Registration service
    pub registration: Arc<RegistrationService>,
    /// Username/password checker
    pub authenticator: Arc<CredentialAuthenticator>,
    /// Session authority
    pub sessions: Arc<SessionManager>,
    /// Per-request access decision
    pub gatekeeper: Arc<Gatekeeper>,
    /// CSRF token service
    pub csrf: Arc<CsrfTokens>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .field("gatekeeper", &self.gatekeeper)
            .finish()
    }
}

impl AppState {
    /// Wires the auth components over a credential store.
    ///
    /// Fails if the authorization rules, role hierarchy, or default role in
    /// `config` do not compile.
    pub fn new(config: AppConfig, users: Arc<dyn UserRepository>) -> AppResult<Self> {
        let hasher = Arc::new(PasswordHasher::new());

        let registration = Arc::new(RegistrationService::new(
            Arc::clone(&users),
            Arc::clone(&hasher),
            &config.auth,
        )?);
        let authenticator = Arc::new(CredentialAuthenticator::new(
            Arc::clone(&users),
            Arc::clone(&hasher),
        ));

        let sessions = Arc::new(SessionManager::new(
            Arc::new(SessionStore::new()),
            &config.session,
        ));
        let policy = Arc::new(AuthorizationPolicy::from_config(&config.authorization)?);
        let gatekeeper = Arc::new(Gatekeeper::new(policy, Arc::clone(&sessions)));
        let csrf = Arc::new(CsrfTokens::new(Arc::clone(&sessions)));

        Ok(Self {
            config: Arc::new(config),
            users,
            registration,
            authenticator,
            sessions,
            gatekeeper,
            csrf,
        })
    }
}
