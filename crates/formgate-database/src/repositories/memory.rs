//! In-memory credential store backed by a concurrent map.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use formgate_core::error::AppError;
use formgate_core::result::AppResult;
use formgate_entity::user::{CreateUser, User};

use super::UserRepository;

/// Credential store for single-node deployments and tests.
///
/// Uniqueness is enforced through the map's entry API, which holds the
/// shard lock across the existence check and the insert.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<DashMap<String, User>>,
}

impl MemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.users.get(username).map(|entry| entry.value().clone()))
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        Ok(self.users.contains_key(username))
    }

    async fn create(&self, data: CreateUser) -> AppResult<User> {
        match self.users.entry(data.username.clone()) {
            Entry::Occupied(_) => Err(AppError::duplicate_username(&data.username)),
            Entry::Vacant(slot) => {
                let user = data.into_user();
                debug!(user_id = %user.id, username = %user.username, "User stored in memory");
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.users.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use formgate_core::error::ErrorKind;
    use formgate_entity::user::Role;

    fn new_user(username: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            password_hash: "$argon2id$v=19$placeholder".to_string(),
            role: Role::new("USER").expect("valid role"),
        }
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let repo = MemoryUserRepository::new();
        let created = repo.create(new_user("alice")).await.expect("created");

        let found = repo
            .find_by_username("alice")
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found.id, created.id);
        assert!(repo.exists_by_username("alice").await.expect("lookup"));
        assert!(!repo.exists_by_username("bob").await.expect("lookup"));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = MemoryUserRepository::new();
        repo.create(new_user("alice")).await.expect("first insert");

        let err = repo.create(new_user("alice")).await.expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::DuplicateUsername);
        assert_eq!(repo.count().await.expect("count"), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_admit_exactly_one() {
        let repo = MemoryUserRepository::new();

        let attempts = (0..16).map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.create(new_user("race")).await })
        });

        let results = futures::future::join_all(attempts).await;
        let successes = results
            .into_iter()
            .map(|joined| joined.expect("task completed"))
            .filter(Result::is_ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(repo.count().await.expect("count"), 1);
    }
}
