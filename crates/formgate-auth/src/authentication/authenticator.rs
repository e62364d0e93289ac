//! Username + password verification against the credential store.

use std::sync::Arc;

use tracing::{debug, warn};

use formgate_core::error::AppError;
use formgate_core::result::AppResult;
use formgate_database::repositories::UserRepository;
use formgate_entity::session::Principal;

use crate::password::PasswordHasher;

/// Turns submitted credentials into a [`Principal`].
///
/// Unknown usernames and wrong passwords fail with the same
/// `InvalidCredentials` error, and an unknown username still pays for one
/// hash verification.
#[derive(Clone)]
pub struct CredentialAuthenticator {
    /// Credential store.
    users: Arc<dyn UserRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
}

impl std::fmt::Debug for CredentialAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialAuthenticator").finish()
    }
}

impl CredentialAuthenticator {
    /// Creates an authenticator over the given store.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Checks the credentials and returns the matching principal.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Principal> {
        let user = self.users.find_by_username(username).await?;

        let matches = self
            .hasher
            .clone()
            .verify_in_background(
                password.to_string(),
                user.as_ref().map(|u| u.password_hash.clone()),
            )
            .await?;

        match user {
            Some(user) if matches => {
                debug!(user_id = %user.id, username = %user.username, "Credentials verified");
                Ok(Principal::from(&user))
            }
            _ => {
                warn!(username = %username, "Invalid login attempt");
                Err(AppError::invalid_credentials())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formgate_core::error::ErrorKind;
    use formgate_database::repositories::MemoryUserRepository;
    use formgate_entity::user::{CreateUser, Role};

    async fn authenticator_with_alice() -> CredentialAuthenticator {
        let hasher = Arc::new(PasswordHasher::new());
        let repo = Arc::new(MemoryUserRepository::new());
        repo.create(CreateUser {
            username: "alice".to_string(),
            password_hash: hasher.hash_password("pw123").expect("hash"),
            role: Role::new("ADMIN").expect("role"),
        })
        .await
        .expect("create");
        CredentialAuthenticator::new(repo, hasher)
    }

    #[tokio::test]
    async fn test_valid_credentials_yield_principal() {
        let auth = authenticator_with_alice().await;
        let principal = auth.authenticate("alice", "pw123").await.expect("valid");
        assert_eq!(principal.username, "alice");
        assert_eq!(principal.role.as_str(), "ADMIN");
    }

    #[tokio::test]
    async fn test_failures_are_indistinguishable() {
        let auth = authenticator_with_alice().await;

        let wrong_password = auth
            .authenticate("alice", "nope")
            .await
            .expect_err("wrong password");
        let unknown_user = auth
            .authenticate("mallory", "pw123")
            .await
            .expect_err("unknown user");

        assert_eq!(wrong_password.kind, ErrorKind::InvalidCredentials);
        assert_eq!(unknown_user.kind, ErrorKind::InvalidCredentials);
        assert_eq!(wrong_password.message, unknown_user.message);
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let auth = authenticator_with_alice().await;
        let err = auth
            .authenticate("Alice", "pw123")
            .await
            .expect_err("different user");
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    }
}
