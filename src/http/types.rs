use axum::extract::OriginalUri;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::error::{AppError, ErrorCode};

/// Wire shape of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: &'static str,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl From<AppError> for ErrorEnvelope {
    fn from(err: AppError) -> Self {
        Self { status: "error", error_code: err.code, message: err.message, details: err.details }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, axum::Json(ErrorEnvelope::from(self))).into_response()
    }
}

/// Method fallback for known routes, so a 405 also carries the envelope.
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> AppError {
    AppError::method_not_allowed(method.as_str(), uri.path())
}
