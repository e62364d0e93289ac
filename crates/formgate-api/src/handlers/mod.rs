//! Route handlers.

pub mod auth;
pub mod join;
pub mod pages;
