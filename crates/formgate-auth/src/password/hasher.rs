//! Argon2id password hashing and verification.

use std::sync::{Arc, OnceLock};

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use formgate_core::error::AppError;
use formgate_core::result::AppResult;

/// Handles password hashing and verification using Argon2id.
///
/// Hashes are stored in PHC string format, so the salt and parameters travel
/// with the hash and a plaintext password is never persisted.
#[derive(Debug, Default)]
pub struct PasswordHasher {
    /// Hash verified against when the user does not exist.
    decoy: OnceLock<String>,
}

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        let argon2 = Argon2::default();
        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Hashes on the blocking thread pool so request workers are not stalled.
    pub async fn hash_in_background(self: Arc<Self>, password: String) -> AppResult<String> {
        tokio::task::spawn_blocking(move || self.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
    }

    /// Verifies on the blocking thread pool.
    ///
    /// With `hash == None` the decoy hash is verified instead and the result
    /// is always `false`.
    pub async fn verify_in_background(
        self: Arc<Self>,
        password: String,
        hash: Option<String>,
    ) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => self.verify_password(&password, &hash),
            None => {
                self.verify_decoy(&password);
                Ok(false)
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
    }

    /// Spends the same work as a real verification for an unknown username.
    ///
    /// Keeps "no such user" and "wrong password" indistinguishable by timing.
    pub fn verify_decoy(&self, password: &str) {
        let decoy = match self.decoy.get() {
            Some(hash) => hash,
            None => match self.hash_password("decoy-password") {
                Ok(hash) => self.decoy.get_or_init(|| hash),
                Err(_) => return,
            },
        };
        let _ = self.verify_password(password, decoy);
    }
}
