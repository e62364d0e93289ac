//! Registration flow: validate, hash, persist.

use std::sync::Arc;

use tracing::{info, warn};

use formgate_core::config::{AuthConfig, SeedUserConfig};
use formgate_core::error::{AppError, ErrorKind};
use formgate_core::result::AppResult;
use formgate_core::types::UserId;
use formgate_database::repositories::UserRepository;
use formgate_entity::user::{CreateUser, Role};

use crate::password::{CredentialValidator, PasswordHasher};

/// Creates user records.
///
/// Uniqueness is decided by [`UserRepository::create`]; the pre-check in
/// [`RegistrationService::register`] only avoids hashing for names that are
/// already taken.
#[derive(Clone)]
pub struct RegistrationService {
    /// Credential store.
    users: Arc<dyn UserRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Input rules.
    validator: CredentialValidator,
    /// Role given to self-registered users.
    default_role: Role,
}

impl std::fmt::Debug for RegistrationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationService")
            .field("validator", &self.validator)
            .field("default_role", &self.default_role)
            .finish()
    }
}

impl RegistrationService {
    /// Creates a registration service.
    ///
    /// Fails if `auth.default_role` is not a valid role name.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        config: &AuthConfig,
    ) -> AppResult<Self> {
        let default_role = Role::new(&config.default_role).map_err(|e| {
            AppError::configuration(format!("auth.default_role: {}", e.message))
        })?;

        Ok(Self {
            users,
            hasher,
            validator: CredentialValidator::new(config),
            default_role,
        })
    }

    /// Registers a new user with the default role.
    ///
    /// Fails with `DuplicateUsername` if the name is taken, including when a
    /// concurrent registration for the same name wins the insert.
    pub async fn register(&self, username: &str, raw_password: &str) -> AppResult<UserId> {
        self.validator.validate(username, raw_password)?;
        self.create(username, raw_password, self.default_role.clone())
            .await
    }

    /// Creates the configured seed accounts whose usernames are still free.
    ///
    /// Returns the number of accounts created.
    pub async fn provision(&self, seeds: &[SeedUserConfig]) -> AppResult<usize> {
        let mut created = 0;

        for seed in seeds {
            let role = Role::new(&seed.role).map_err(|e| {
                AppError::configuration(format!(
                    "auth.seed_users[{}].role: {}",
                    seed.username, e.message
                ))
            })?;

            match self.create(&seed.username, &seed.password, role).await {
                Ok(_) => created += 1,
                Err(e) if e.is(ErrorKind::DuplicateUsername) => {
                    warn!(username = %seed.username, "Seed user already exists, skipping");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(created)
    }

    async fn create(&self, username: &str, raw_password: &str, role: Role) -> AppResult<UserId> {
        if self.users.exists_by_username(username).await? {
            warn!(username = %username, "Registration rejected: username taken");
            return Err(AppError::duplicate_username(username));
        }

        let password_hash = self
            .hasher
            .clone()
            .hash_in_background(raw_password.to_string())
            .await?;

        let user = self
            .users
            .create(CreateUser {
                username: username.to_string(),
                password_hash,
                role,
            })
            .await
            .inspect_err(|e| {
                if e.is(ErrorKind::DuplicateUsername) {
                    warn!(username = %username, "Registration lost a race for the username");
                }
            })?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");

        Ok(user.id)
    }
}
