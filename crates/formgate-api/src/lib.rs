//! # formgate-api
//!
//! HTTP layer for FormGate built on Axum.
//!
//! Provides the form-login endpoints, JSON page descriptors, the gatekeeper
//! and CSRF middleware, request logging, extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
