//! Principal extractors fed by the gatekeeper middleware.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use formgate_core::error::AppError;
use formgate_entity::session::Principal;

use crate::error::ApiError;

/// The principal resolved by the gatekeeper, if the request carried a valid
/// session. Inserted into request extensions for every allowed request.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Principal>);

impl CurrentUser {
    /// The principal, if authenticated.
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default())
    }
}

/// An authenticated principal; rejects with `InvalidSession` otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl std::ops::Deref for AuthUser {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .and_then(|current| current.0.clone())
            .map(AuthUser)
            .ok_or_else(|| ApiError(AppError::invalid_session("Authentication required")))
    }
}
