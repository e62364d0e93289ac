//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use formgate_core::error::{AppError, ErrorKind};

/// Result type for handlers and middleware.
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP-facing wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Status code for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::DuplicateUsername => StatusCode::CONFLICT,
        ErrorKind::InvalidCredentials | ErrorKind::InvalidSession => StatusCode::UNAUTHORIZED,
        ErrorKind::SessionLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::AuthorizationDenied | ErrorKind::CsrfRejected => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Database
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);

        let message = if status.is_server_error() {
            tracing::error!(kind = %err.kind, error = %err.message, source = ?err.source, "Request failed");
            "An internal error occurred".to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::DuplicateUsername), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::InvalidSession), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::AuthorizationDenied), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::Database), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response =
            ApiError(AppError::database("connection refused to 10.0.0.5")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(body["error"], "DATABASE");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        let response = ApiError(AppError::duplicate_username("alice")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(body["error"], "DUPLICATE_USERNAME");
    }
}
