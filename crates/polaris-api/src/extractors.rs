//! # Request Body Extraction
//!
//! Handlers take their body as `Result<Json<Value>, JsonRejection>` so that
//! malformed JSON is reported in the same envelope as a field-level
//! validation failure, and so a handler can check preconditions before
//! validating. [`extract_payload`] then builds the typed request.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use polaris_core::{FromJsonPayload, ValidationIssues};
use serde_json::Value;

use crate::error::AppError;

/// Turn an extracted JSON body into a validated request of type `T`.
///
/// Body-level failures (wrong content type, undecodable JSON) become a
/// single form error; structural problems become field errors.
pub fn extract_payload<T: FromJsonPayload>(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) = body.map_err(|rejection| {
        AppError::InvalidPayload(ValidationIssues::form(rejection.body_text()))
    })?;
    T::from_json(&value).map_err(AppError::InvalidPayload)
}
