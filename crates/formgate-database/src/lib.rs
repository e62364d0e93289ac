//! # formgate-database
//!
//! Credential store for FormGate: the [`UserRepository`] trait plus a
//! PostgreSQL implementation and an in-memory one for single-node runs
//! and tests.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{MemoryUserRepository, PgUserRepository, UserRepository};
