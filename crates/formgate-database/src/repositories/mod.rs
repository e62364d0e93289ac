//! Credential store abstraction and its implementations.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use formgate_core::result::AppResult;
use formgate_entity::user::{CreateUser, User};

pub use memory::MemoryUserRepository;
pub use postgres::PgUserRepository;

/// Persists username → password hash + role records.
///
/// Implementations must make [`UserRepository::create`] atomic with
/// respect to the username: of two concurrent creates for the same
/// username, exactly one succeeds and the other fails with
/// `ErrorKind::DuplicateUsername`.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Whether a user with this username exists.
    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    /// Insert a new user, failing with `DuplicateUsername` if the name is taken.
    async fn create(&self, data: CreateUser) -> AppResult<User>;

    /// Number of stored users.
    async fn count(&self) -> AppResult<u64>;
}
