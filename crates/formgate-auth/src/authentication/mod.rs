//! Credential checks for form login.

pub mod authenticator;

pub use authenticator::CredentialAuthenticator;
