use http::StatusCode;
use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationFailed,
    InvalidId,
    InvalidName,
    InvalidIsCompleted,
    InvalidJson,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "ERR_VALIDATION_FAILED",
            ErrorCode::InvalidId => "ERR_INVALID_ID",
            ErrorCode::InvalidName => "ERR_INVALID_NAME",
            ErrorCode::InvalidIsCompleted => "ERR_INVALID_IS_COMPLETED",
            ErrorCode::InvalidJson => "ERR_INVALID_JSON",
            ErrorCode::NotFound => "ERR_NOT_FOUND",
            ErrorCode::MethodNotAllowed => "ERR_METHOD_NOT_ALLOWED",
            ErrorCode::InternalServerError => "ERR_INTERNAL_SERVER_ERROR",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::InvalidId => "ID must be a valid UUID",
            ErrorCode::InvalidName => "Name must be a string and between 1 and 100 characters",
            ErrorCode::InvalidIsCompleted => "is_completed must be a boolean",
            ErrorCode::InvalidJson => "Invalid JSON",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::MethodNotAllowed => "Method not allowed",
            ErrorCode::InternalServerError => "Internal Server Error",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind { Validation, NotFound, Internal }

/// The one error type every request path produces. The HTTP layer renders
/// it into the `{status, error_code, message, details}` envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AppError {
    pub message: String,
    pub status: StatusCode,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self { message: message.into(), status: code.status(), code, details }
    }

    pub fn from_code(code: ErrorCode, details: Option<String>) -> Self {
        Self::new(code, code.message(), details)
    }

    pub fn not_found(id: &str) -> Self {
        Self::from_code(ErrorCode::NotFound, Some(format!("Duty with ID {id} not found")))
    }

    pub fn route_not_found(path: &str) -> Self {
        Self::from_code(ErrorCode::NotFound, Some(format!("No route for {path}")))
    }

    pub fn method_not_allowed(method: &str, path: &str) -> Self {
        Self::from_code(ErrorCode::MethodNotAllowed, Some(format!("{method} is not supported on {path}")))
    }

    pub fn invalid_path(details: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::InvalidId, Some(details.into()))
    }

    pub fn invalid_json(details: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::InvalidJson, Some(details.into()))
    }

    /// Keeps the full context chain as details; the message stays generic.
    pub fn internal(cause: &anyhow::Error) -> Self {
        Self::from_code(ErrorCode::InternalServerError, Some(format!("{cause:#}")))
    }

    pub fn kind(&self) -> ErrorKind {
        match self.code {
            ErrorCode::NotFound | ErrorCode::MethodNotAllowed => ErrorKind::NotFound,
            ErrorCode::InternalServerError => ErrorKind::Internal,
            _ => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn codes_carry_their_status() {
        assert_eq!(ErrorCode::InvalidName.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ErrorCode::InternalServerError.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_cites_the_id() {
        let err = AppError::not_found("00000000-0000-0000-0000-000000000000");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message, "Resource not found");
        assert_eq!(err.details.as_deref(), Some("Duty with ID 00000000-0000-0000-0000-000000000000 not found"));
    }

    #[test]
    fn internal_keeps_cause_chain_in_details() {
        let cause = Err::<(), _>(anyhow::anyhow!("disk I/O error"))
            .context("Failed to update duty status")
            .unwrap_err();
        let err = AppError::internal(&cause);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message, "Internal Server Error");
        assert_eq!(err.details.as_deref(), Some("Failed to update duty status: disk I/O error"));
    }

    #[test]
    fn code_serializes_as_wire_string() {
        let v = serde_json::to_value(ErrorCode::InvalidIsCompleted).unwrap();
        assert_eq!(v, serde_json::json!("ERR_INVALID_IS_COMPLETED"));
    }
}
