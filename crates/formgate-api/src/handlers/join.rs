//! Registration handler.

use axum::extract::{Form, State};
use axum::response::Response;
use validator::Validate;

use formgate_core::error::AppError;

use crate::dto::request::JoinForm;
use crate::dto::response::found;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /joinProc
///
/// Registers the account and sends the browser to the login page.
/// A taken username answers 409 and a rejected username or password 400.
pub async fn join_process(
    State(state): State<AppState>,
    Form(form): Form<JoinForm>,
) -> ApiResult<Response> {
    form.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    state
        .registration
        .register(&form.username, &form.password)
        .await?;

    Ok(found(&state.config.security.form_login.login_page))
}
