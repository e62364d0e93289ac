//! Session domain entities.

pub mod model;
pub mod token;

pub use model::{Principal, Session, SessionState};
pub use token::SessionId;
