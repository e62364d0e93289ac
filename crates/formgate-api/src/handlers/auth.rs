//! Form login and logout handlers.

use axum::extract::{Form, State};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};
use validator::Validate;

use formgate_core::error::ErrorKind;

use crate::dto::request::LoginForm;
use crate::dto::response::found;
use crate::error::ApiResult;
use crate::extractors::SessionCookie;
use crate::extractors::session::{cleared_session_cookie, session_cookie, session_id_from};
use crate::middleware::gatekeeper::SAVED_REQUEST_ATTRIBUTE;
use crate::state::AppState;

/// Failure reason for a wrong username or password.
const INVALID_CREDENTIALS: &str = "invalid_credentials";
/// Failure reason for a login refused by the concurrent-session cap.
const SESSION_LIMIT: &str = "session_limit";

/// POST /loginProc
///
/// On success the session identifier is rotated, the CSRF token is
/// reissued on next use, and the browser is sent to the request that
/// triggered the login or to the default success URL. Failures redirect
/// to the failure URL with a reason.
pub async fn login_process(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let login = &state.config.security.form_login;
    let cookie_config = &state.config.session.cookie;
    let current = session_id_from(&jar, cookie_config);

    if form.validate().is_err() {
        return Ok(found(&failure_location(&login.failure_url, INVALID_CREDENTIALS)));
    }

    let principal = match state
        .authenticator
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(principal) => principal,
        Err(e) if e.is(ErrorKind::InvalidCredentials) => {
            return Ok(found(&failure_location(&login.failure_url, INVALID_CREDENTIALS)));
        }
        Err(e) => return Err(e.into()),
    };

    let saved = match &current {
        Some(id) => state
            .sessions
            .attribute(id, SAVED_REQUEST_ATTRIBUTE)
            .await
            .ok()
            .flatten(),
        None => None,
    };

    let id = match state.sessions.authenticate(current.as_ref(), principal).await {
        Ok(id) => id,
        Err(e) if e.is(ErrorKind::SessionLimitExceeded) => {
            warn!(username = %form.username, "Login refused by session limit");
            return Ok(found(&failure_location(&login.failure_url, SESSION_LIMIT)));
        }
        Err(e) => return Err(e.into()),
    };

    state
        .sessions
        .take_attribute(&id, SAVED_REQUEST_ATTRIBUTE)
        .await?;
    state.csrf.clear(&id).await?;

    let target = saved
        .filter(|target| is_local_redirect(target))
        .unwrap_or_else(|| login.default_success_url.clone());

    info!(username = %form.username, session_id = %id, "Form login succeeded");

    let jar = jar.add(session_cookie(cookie_config, &id));
    Ok((jar, found(&target)).into_response())
}

/// GET /logout
pub async fn logout(
    State(state): State<AppState>,
    session: SessionCookie,
    jar: CookieJar,
) -> Response {
    if let Some(id) = session.id() {
        state.sessions.logout(id).await;
    }

    let jar = jar.remove(cleared_session_cookie(&state.config.session.cookie));
    (jar, found(&state.config.security.logout.success_url)).into_response()
}

/// Query parameter carrying the failure reason.
const FAILURE_PARAMETER: &str = "error";

/// The failure URL with its `error` parameter set to `reason`.
///
/// Other query parameters are kept; an existing `error` value, bare or
/// not, is replaced.
fn failure_location(failure_url: &str, reason: &str) -> String {
    let (path, query) = failure_url.split_once('?').unwrap_or((failure_url, ""));

    let mut pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
    pairs.retain(|(key, _)| key != FAILURE_PARAMETER);
    pairs.push((FAILURE_PARAMETER.to_string(), reason.to_string()));

    match serde_urlencoded::to_string(&pairs) {
        Ok(query) => format!("{path}?{query}"),
        Err(_) => path.to_string(),
    }
}

/// Whether `target` stays on this site.
fn is_local_redirect(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}
