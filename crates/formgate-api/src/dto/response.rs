//! Response DTOs.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use formgate_entity::session::Principal;

/// The authenticated user as shown on pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Login name.
    pub username: String,
    /// Role tag.
    pub role: String,
}

impl From<&Principal> for UserResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            username: principal.username.clone(),
            role: principal.role.to_string(),
        }
    }
}

/// A form the client is expected to submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDescriptor {
    /// Submission URL.
    pub action: String,
    /// Submission method.
    pub method: String,
    /// Field names, in display order.
    pub fields: Vec<String>,
}

impl FormDescriptor {
    /// A POST form with the given fields.
    pub fn post(action: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            action: action.into(),
            method: "POST".to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// JSON description of a page, in place of a rendered template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    /// Page name.
    pub page: String,
    /// Current user, if logged in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    /// Form to submit from this page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormDescriptor>,
    /// CSRF token to send with the form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    /// Failure reason from a previous submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Requested path, for catch-all pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl PageResponse {
    /// A page with only a name and the current user.
    pub fn new(page: impl Into<String>, user: Option<&Principal>) -> Self {
        Self {
            page: page.into(),
            user: user.map(UserResponse::from),
            form: None,
            csrf_token: None,
            error: None,
            path: None,
        }
    }
}

/// A `302 Found` redirect.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
