// ── HTTP error mapping ──
//
// Translates `CoreError` into stable JSON error bodies. Handlers return
// `Result<_, ApiError>`; the `IntoResponse` impl picks the status code and
// wire shape. Internal detail (router messages, store paths) never leaks
// into 5xx bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use wispay_core::CoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid session token")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "missing or invalid session token".to_string(),
            ),
            Self::NotFound => (StatusCode::NOT_FOUND, "not_found", "not found".to_string()),
            Self::Core(core) => map_core_error(core),
        };

        if status.is_server_error() {
            error!(status = %status, error = %self, "request failed");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

fn map_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::InvalidPackage { .. }
        | CoreError::InvalidContact { .. }
        | CoreError::InvalidToken { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        CoreError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            err.to_string(),
        ),
        CoreError::RequestNotFound { .. } | CoreError::AccountNotFound { .. } => {
            (StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        CoreError::DuplicateRequest { .. }
        | CoreError::AmbiguousCorrelation { .. }
        | CoreError::InvalidTransition { .. } => {
            (StatusCode::CONFLICT, "conflict", err.to_string())
        }
        CoreError::ProvisioningFailed { .. } => (
            StatusCode::BAD_GATEWAY,
            "provisioning_failed",
            "could not provision the account; please try again later".to_string(),
        ),
        CoreError::NotificationFailed { .. }
        | CoreError::ConnectionFailed { .. }
        | CoreError::AuthenticationFailed { .. }
        | CoreError::Timeout { .. }
        | CoreError::Api { .. } => (
            StatusCode::BAD_GATEWAY,
            "upstream_error",
            "upstream service unavailable".to_string(),
        ),
        CoreError::Store { .. } | CoreError::Config { .. } | CoreError::Internal(_)
        | CoreError::AccountExists { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "internal error".to_string(),
        ),
    }
}
