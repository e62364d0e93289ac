//! Per-request access control.
//!
//! Every request passes through [`gatekeeper`] before reaching a handler.
//! Allowed requests get a [`CurrentUser`] extension; unauthenticated ones
//! are sent to the login page (browsers) or answered with 401 (API
//! clients); authenticated requests lacking the role get 403.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use formgate_auth::GateDecision;
use formgate_core::config::SecurityConfig;
use formgate_core::error::AppError;
use formgate_entity::session::SessionId;

use crate::dto::response::found;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::extractors::session::{session_cookie, session_id_from};
use crate::state::AppState;

/// Session attribute holding the request to return to after login.
pub const SAVED_REQUEST_ATTRIBUTE: &str = "saved_request";

/// Applies the authorization policy to the request.
pub async fn gatekeeper(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = session_id_from(&jar, &state.config.session.cookie);
    let method = request.method().as_str().to_string();
    let path = request.uri().path().to_string();

    let decision = match state
        .gatekeeper
        .check(&method, &path, session.as_ref())
        .await
    {
        Ok(decision) => decision,
        Err(e) => return ApiError(e).into_response(),
    };

    match decision {
        GateDecision::Allow(principal) => {
            request.extensions_mut().insert(CurrentUser(principal));
            next.run(request).await
        }
        GateDecision::Challenge => {
            challenge(
                &state,
                jar,
                session,
                request.headers(),
                request.method(),
                request.uri(),
            )
            .await
        }
        GateDecision::Deny(_) => ApiError(AppError::authorization_denied(format!(
            "Insufficient role for {path}"
        )))
        .into_response(),
    }
}

/// Sends an unauthenticated request to log in.
///
/// Browsers are redirected to the login page, and a GET is remembered in
/// the pre-login session so a successful login can return to it.
async fn challenge(
    state: &AppState,
    jar: CookieJar,
    session: Option<SessionId>,
    headers: &HeaderMap,
    method: &Method,
    uri: &Uri,
) -> Response {
    if !wants_html(headers) {
        return ApiError(AppError::invalid_session("Authentication required")).into_response();
    }

    let cookie_config = &state.config.session.cookie;
    let (id, created) = state.sessions.ensure(session.as_ref()).await;

    if method == Method::GET && is_resumable(&state.config.security, uri.path()) {
        let target = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        if let Err(e) = state
            .sessions
            .set_attribute(&id, SAVED_REQUEST_ATTRIBUTE, target)
            .await
        {
            warn!(session_id = %id, error = %e, "Could not save request for post-login redirect");
        }
    }

    let jar = if created {
        jar.add(session_cookie(cookie_config, &id))
    } else {
        jar
    };

    (jar, found(&state.config.security.form_login.login_page)).into_response()
}

/// Whether a login may send the browser back to `path`.
///
/// The login and logout endpoints are never resumed: returning to logout
/// would end the session the login just created.
fn is_resumable(security: &SecurityConfig, path: &str) -> bool {
    path != security.form_login.login_page
        && path != security.form_login.processing_url
        && path != security.logout.url
}

/// Whether the client is a browser expecting a page rather than JSON.
fn wants_html(headers: &HeaderMap) -> bool {
    match headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
        None => true,
        Some(accept) => accept.contains("text/html") || accept.trim() == "*/*",
    }
}
