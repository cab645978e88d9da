//! Route handlers.

pub mod analysis;
pub mod health;
pub mod texts;

use crate::error::ApiError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path};
use textstat_core::TextId;
use uuid::Uuid;

/// Parses the `textId` path segment.
pub(crate) fn text_id(path: Result<Path<String>, PathRejection>) -> Result<TextId, ApiError> {
    let Path(raw) = path.map_err(|rejection| ApiError::field("textId", rejection.body_text()))?;
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::field("textId", "must be a valid text id"))
}

pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::field("body", rejection.body_text()))
}
