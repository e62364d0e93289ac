//! PostgreSQL connection pool for the credential store.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use formgate_core::config::DatabaseConfig;
use formgate_core::error::{AppError, ErrorKind};

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Connects using `database.url` and verifies the connection with a ping.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| AppError::configuration("database.url is not set"))?;

        info!(
            url = %mask_password(url),
            max_connections = config.max_connections,
            "Connecting to credential store"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Database ping failed", e))?;

        info!("Credential store connected");
        Ok(Self { pool })
    }

    /// Return the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Mask the password portion of a database URL for safe logging.
fn mask_password(url: &str) -> String {
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url.rfind('@') {
        Some(at) if at > scheme_end => match url[scheme_end..at].find(':') {
            Some(colon) => {
                let colon = scheme_end + colon;
                format!("{}:****{}", &url[..colon], &url[at..])
            }
            None => url.to_string(),
        },
        _ => url.to_string(),
    }
}
