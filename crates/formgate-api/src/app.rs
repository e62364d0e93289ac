//! Application builder: wires the credential store, auth components, and
//! router into a running server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use formgate_auth::SessionCleanup;
use formgate_core::config::AppConfig;
use formgate_core::error::AppError;
use formgate_database::{DatabasePool, MemoryUserRepository, PgUserRepository, UserRepository};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state).layer(TraceLayer::new_for_http())
}

/// Runs the FormGate server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FormGate server...");

    // ── Step 1: Credential store ─────────────────────────────────
    let (users, db_pool): (Arc<dyn UserRepository>, Option<DatabasePool>) =
        if config.database.url.is_some() {
            let pool = DatabasePool::connect(&config.database).await?;
            let repo = Arc::new(PgUserRepository::new(pool.pool().clone()));
            (repo, Some(pool))
        } else {
            tracing::warn!("database.url not set; accounts are kept in memory only");
            (Arc::new(MemoryUserRepository::new()), None)
        };

    // ── Step 2: Auth components ──────────────────────────────────
    let state = AppState::new(config.clone(), users)?;

    let seeded = state.registration.provision(&config.auth.seed_users).await?;
    if seeded > 0 {
        tracing::info!(count = seeded, "Provisioned seed users");
    }

    // ── Step 3: Session cleanup ──────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cleanup = SessionCleanup::new(
        Arc::clone(&state.sessions),
        config.session.cleanup_interval_seconds,
    );
    let cleanup_handle = tokio::spawn(async move {
        cleanup.run(shutdown_rx).await;
    });

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = build_app(state);
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(address = %addr, "FormGate server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, cleanup_handle).await.is_err() {
        tracing::warn!("Session cleanup did not stop within the grace period");
    }

    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("FormGate server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
