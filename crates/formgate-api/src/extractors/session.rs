//! Session cookie transport.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use formgate_core::config::SessionCookieConfig;
use formgate_entity::session::SessionId;

use crate::state::AppState;

/// The session identifier carried by the request's session cookie, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionCookie(pub Option<SessionId>);

impl SessionCookie {
    /// The identifier, if present.
    pub fn id(&self) -> Option<&SessionId> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for SessionCookie {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self(session_id_from(&jar, &state.config.session.cookie)))
    }
}

/// Reads the session identifier from a cookie jar.
pub fn session_id_from(jar: &CookieJar, config: &SessionCookieConfig) -> Option<SessionId> {
    jar.get(&config.name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .map(SessionId::from_raw)
}

/// Builds the cookie that carries `id`.
pub fn session_cookie(config: &SessionCookieConfig, id: &SessionId) -> Cookie<'static> {
    Cookie::build((config.name.clone(), id.as_str().to_string()))
        .path(config.path.clone())
        .http_only(config.http_only)
        .secure(config.secure)
        .same_site(same_site(&config.same_site))
        .build()
}

/// Builds the cookie that clears the session cookie in the browser.
pub fn cleared_session_cookie(config: &SessionCookieConfig) -> Cookie<'static> {
    Cookie::build((config.name.clone(), String::new()))
        .path(config.path.clone())
        .build()
}

fn same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}
