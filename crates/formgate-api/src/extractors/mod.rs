//! Request extractors.

pub mod auth;
pub mod session;

pub use auth::{AuthUser, CurrentUser};
pub use session::SessionCookie;
