//! PostgreSQL credential store.
//!
//! Expects a `users` table with columns `id UUID`, `username TEXT UNIQUE`,
//! `password_hash TEXT`, `role TEXT`, and `created_at TIMESTAMPTZ`. The
//! schema itself is managed outside this crate.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};

use formgate_core::error::{AppError, ErrorKind};
use formgate_core::result::AppResult;
use formgate_entity::user::{CreateUser, User};

use super::UserRepository;

/// Credential store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
        })
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check username", e)
            })
    }

    async fn create(&self, data: CreateUser) -> AppResult<User> {
        let user = data.into_user();

        // The unique constraint on `username` is what makes this race-free;
        // `ON CONFLICT DO NOTHING` turns the loser of a race into "no row".
        let inserted = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, username, password_hash, role, created_at)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (username) DO NOTHING
               RETURNING id, username, password_hash, role, created_at"#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return AppError::duplicate_username(&user.username);
                }
            }
            AppError::with_source(ErrorKind::Database, "Failed to insert user", e)
        })?;

        match inserted {
            Some(user) => {
                info!(user_id = %user.id, username = %user.username, "User persisted");
                Ok(user)
            }
            None => {
                warn!(username = %user.username, "Insert skipped: username already exists");
                Err(AppError::duplicate_username(&user.username))
            }
        }
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;
        Ok(total.max(0) as u64)
    }
}
