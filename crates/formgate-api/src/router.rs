//! Route definitions for the FormGate HTTP surface.
//!
//! Login and logout URLs come from the `security` configuration. Every
//! route, including the fallback, sits behind the gatekeeper, so a path
//! with no handler is still subject to the authorization rules.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the security middleware.
///
/// Layers run outermost first: request logging, CSRF check, gatekeeper.
pub fn build_router(state: AppState) -> Router {
    let login_page = state.config.security.form_login.login_page.clone();
    let processing_url = state.config.security.form_login.processing_url.clone();
    let logout_url = state.config.security.logout.url.clone();

    Router::new()
        .route("/", get(handlers::pages::home))
        .route(&login_page, get(handlers::pages::login_page))
        .route(&processing_url, post(handlers::auth::login_process))
        .route(&logout_url, get(handlers::auth::logout))
        .route("/join", get(handlers::pages::join_page))
        .route("/joinProc", post(handlers::join::join_process))
        .route("/admin", get(handlers::pages::admin))
        .route("/manager", get(handlers::pages::manager))
        .route("/my", get(handlers::pages::my_page))
        .route("/my/{*rest}", get(handlers::pages::my_page))
        .fallback(handlers::pages::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::gatekeeper::gatekeeper,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::csrf::csrf_protection,
        ))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}
