//! # formgate-auth
//!
//! Authentication and authorization core for FormGate, independent of the
//! HTTP layer.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing and credential input rules
//! - `registration`: account creation with the default role
//! - `authentication`: username/password verification
//! - `session`: the session table and the session authority
//! - `policy`: ordered path rules and the role hierarchy
//! - `gate`: per-request allow/challenge/deny decision
//! - `csrf`: per-session synchronizer tokens

pub mod authentication;
pub mod csrf;
pub mod gate;
pub mod password;
pub mod policy;
pub mod registration;
pub mod session;

pub use authentication::CredentialAuthenticator;
pub use csrf::CsrfTokens;
pub use gate::{GateDecision, Gatekeeper};
pub use password::{CredentialValidator, PasswordHasher};
pub use policy::{AuthorizationPolicy, RoleHierarchy, RoleRequirement};
pub use registration::RegistrationService;
pub use session::{SessionCleanup, SessionManager, SessionStore};
