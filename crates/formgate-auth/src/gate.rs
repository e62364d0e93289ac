//! Per-request access decision.

use std::sync::Arc;

use tracing::{debug, warn};

use formgate_core::error::AppError;
use formgate_core::result::AppResult;
use formgate_entity::session::{Principal, SessionId};

use crate::policy::{AuthorizationPolicy, RoleRequirement, is_normalized};
use crate::session::SessionManager;

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through, with the caller's principal if it has one.
    Allow(Option<Principal>),
    /// No valid session where one is required.
    Challenge,
    /// Authenticated, but the role does not meet the requirement.
    Deny(Principal),
}

/// Combines the authorization policy with session resolution.
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    /// Path rules and hierarchy.
    policy: Arc<AuthorizationPolicy>,
    /// Session authority.
    sessions: Arc<SessionManager>,
}

impl Gatekeeper {
    /// Creates a gatekeeper.
    pub fn new(policy: Arc<AuthorizationPolicy>, sessions: Arc<SessionManager>) -> Self {
        Self { policy, sessions }
    }

    /// Decides whether a request may proceed.
    ///
    /// The only state change is the session's last-access time. Paths that
    /// are not in canonical form fail with `Validation` before any rule is
    /// consulted.
    pub async fn check(
        &self,
        method: &str,
        path: &str,
        session: Option<&SessionId>,
    ) -> AppResult<GateDecision> {
        if !is_normalized(path) {
            warn!(path = %path, "Rejected non-canonical request path");
            return Err(AppError::validation("Request path is not in canonical form"));
        }

        let requirement = self.policy.required_role(method, path);

        let principal = match session {
            Some(id) => match self.sessions.validate(id).await {
                Ok(principal) => Some(principal),
                Err(e) => {
                    debug!(session_id = %id, reason = %e.message, "Session not usable");
                    None
                }
            },
            None => None,
        };

        if requirement.is_public() {
            return Ok(GateDecision::Allow(principal));
        }

        let Some(principal) = principal else {
            debug!(method = %method, path = %path, "Unauthenticated request challenged");
            return Ok(GateDecision::Challenge);
        };

        if self.policy.is_satisfied_by(requirement, &principal.role) {
            Ok(GateDecision::Allow(Some(principal)))
        } else {
            warn!(
                user = %principal.username,
                role = %principal.role,
                method = %method,
                path = %path,
                required = %describe(requirement),
                "Access denied"
            );
            Ok(GateDecision::Deny(principal))
        }
    }

    /// The authorization policy in effect.
    pub fn policy(&self) -> &AuthorizationPolicy {
        &self.policy
    }
}

fn describe(requirement: &RoleRequirement) -> String {
    match requirement {
        RoleRequirement::Public => "public".to_string(),
        RoleRequirement::Authenticated => "authenticated".to_string(),
        RoleRequirement::RoleOrAbove(role) => format!("{role} or above"),
        RoleRequirement::AnyOf(roles) => roles
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join("|"),
    }
}
