//! Core type definitions used across the FormGate workspace.

pub mod id;
pub mod session_limit;

pub use id::UserId;
pub use session_limit::SessionLimit;
