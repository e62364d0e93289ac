//! Page handlers.
//!
//! Pages are described as JSON rather than rendered templates. Pages that
//! host a form also carry the session's CSRF token.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::Uri;
use axum_extra::extract::cookie::CookieJar;

use formgate_core::error::AppError;

use crate::dto::request::LoginPageQuery;
use crate::dto::response::{FormDescriptor, PageResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::session::{session_cookie, session_id_from};
use crate::extractors::{AuthUser, CurrentUser};
use crate::state::AppState;

/// GET /
pub async fn home(current: CurrentUser) -> Json<PageResponse> {
    Json(PageResponse::new("home", current.principal()))
}

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    current: CurrentUser,
    Query(query): Query<LoginPageQuery>,
) -> ApiResult<(CookieJar, Json<PageResponse>)> {
    let (jar, csrf_token) = issue_csrf_token(&state, jar).await?;

    let mut page = PageResponse::new("login", current.principal());
    page.form = Some(FormDescriptor::post(
        state.config.security.form_login.processing_url.clone(),
        &["username", "password"],
    ));
    page.csrf_token = csrf_token;
    page.error = query.error;

    Ok((jar, Json(page)))
}

/// GET /join
pub async fn join_page(
    State(state): State<AppState>,
    jar: CookieJar,
    current: CurrentUser,
) -> ApiResult<(CookieJar, Json<PageResponse>)> {
    let (jar, csrf_token) = issue_csrf_token(&state, jar).await?;

    let mut page = PageResponse::new("join", current.principal());
    page.form = Some(FormDescriptor::post("/joinProc", &["username", "password"]));
    page.csrf_token = csrf_token;

    Ok((jar, Json(page)))
}

/// GET /admin
pub async fn admin(user: AuthUser) -> Json<PageResponse> {
    Json(PageResponse::new("admin", Some(&user.0)))
}

/// GET /manager
pub async fn manager(user: AuthUser) -> Json<PageResponse> {
    Json(PageResponse::new("manager", Some(&user.0)))
}

/// GET /my and everything below it
pub async fn my_page(user: AuthUser, uri: Uri) -> Json<PageResponse> {
    let mut page = PageResponse::new("my", Some(&user.0));
    page.path = Some(uri.path().to_string());
    Json(page)
}

/// Fallback for unrouted paths that passed the gatekeeper.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError(AppError::not_found(format!("No page at {}", uri.path())))
}

/// Makes sure the client has a session and returns its CSRF token.
///
/// Returns `None` for the token when CSRF protection is disabled. The
/// jar gains a session cookie only when a session was created.
async fn issue_csrf_token(
    state: &AppState,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Option<String>)> {
    if !state.config.security.csrf.enabled {
        return Ok((jar, None));
    }

    let cookie_config = &state.config.session.cookie;
    let current = session_id_from(&jar, cookie_config);
    let (id, created) = state.sessions.ensure(current.as_ref()).await;
    let token = state.csrf.token(&id).await?;

    let jar = if created {
        jar.add(session_cookie(cookie_config, &id))
    } else {
        jar
    };

    Ok((jar, Some(token)))
}
