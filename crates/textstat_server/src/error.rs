//! HTTP error mapping.
//!
//! Every handler failure becomes one [`ApiError`]; the response body is
//! always `{code, message}` plus `details` for validation failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use textstat_core::{QueryValidationError, RepoError, TextServiceError, TextValidationError};
use thiserror::Error;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    #[error("Please authenticate")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Text not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let detail = FieldError::new(field, message);
        Self::Validation {
            message: format!("\"{}\" {}", detail.field, detail.message),
            details: vec![detail],
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, details) = match self {
            Self::Validation { message, details } => (message, details),
            Self::Internal(cause) => {
                log::error!("event=request_failed module=api status=error error={cause}");
                ("Internal server error".to_string(), Vec::new())
            }
            other => (other.to_string(), Vec::new()),
        };

        let body = ErrorBody {
            code: status.as_u16(),
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

impl From<TextValidationError> for ApiError {
    fn from(value: TextValidationError) -> Self {
        Self::field("value", value.to_string())
    }
}

impl From<QueryValidationError> for ApiError {
    fn from(value: QueryValidationError) -> Self {
        Self::field(value.field(), value.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<TextServiceError> for ApiError {
    fn from(value: TextServiceError) -> Self {
        match value {
            TextServiceError::Validation(err) => err.into(),
            TextServiceError::NotFound(_) => Self::NotFound,
            TextServiceError::Repo(err) => err.into(),
            other @ TextServiceError::InconsistentState(_) => Self::Internal(other.to_string()),
        }
    }
}
