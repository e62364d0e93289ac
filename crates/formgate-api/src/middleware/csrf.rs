//! CSRF token check for state-changing requests.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use formgate_auth::csrf::is_safe_method;
use formgate_core::error::AppError;

use crate::error::{ApiError, ApiResult};
use crate::extractors::session::session_id_from;
use crate::state::AppState;

/// Largest form body buffered while looking for the token field.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Requires the session's CSRF token on every non-safe request.
///
/// The token is taken from the configured header, or from the configured
/// form field of a `application/x-www-form-urlencoded` body. A body read
/// for the check is handed on to the handler unchanged.
pub async fn csrf_protection(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let config = &state.config.security.csrf;
    if !config.enabled || is_safe_method(request.method().as_str()) {
        return next.run(request).await;
    }

    let session = session_id_from(&jar, &state.config.session.cookie);
    let header_token = request
        .headers()
        .get(config.header_name.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (request, token) = match header_token {
        Some(token) => (request, Some(token)),
        None if is_form(request.headers()) => {
            match read_form_field(request, &config.parameter_name).await {
                Ok(read) => read,
                Err(e) => return e.into_response(),
            }
        }
        None => (request, None),
    };

    match state.csrf.verify(session.as_ref(), token.as_deref()).await {
        Ok(()) => next.run(request).await,
        Err(e) => ApiError(e).into_response(),
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Buffers the body, extracts `field`, and rebuilds the request.
async fn read_form_field(request: Request, field: &str) -> ApiResult<(Request, Option<String>)> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|e| ApiError(AppError::validation(format!("Unreadable form body: {e}"))))?;

    let value = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes)
        .ok()
        .and_then(|pairs| {
            pairs
                .into_iter()
                .find(|(name, _)| name == field)
                .map(|(_, value)| value)
        });

    Ok((Request::from_parts(parts, Body::from(bytes)), value))
}
