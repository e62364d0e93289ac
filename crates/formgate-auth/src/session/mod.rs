//! Session lifecycle: the session table, its authority, and cleanup.

pub mod cleanup;
pub mod manager;
pub mod store;

pub use cleanup::SessionCleanup;
pub use manager::SessionManager;
pub use store::{SessionStore, SessionTable};
