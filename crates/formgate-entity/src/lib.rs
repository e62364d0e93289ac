//! # formgate-entity
//!
//! Domain entity models for FormGate. [`user`] holds the persisted user
//! record and its role tag; [`session`] holds the in-process session
//! table entries and the principal derived from them.

pub mod session;
pub mod user;
