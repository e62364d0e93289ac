//! Axum middleware stack.

pub mod csrf;
pub mod gatekeeper;
pub mod logging;
