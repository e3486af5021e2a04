//! # API Error Types
//!
//! [`AppError`] implements `axum::response::IntoResponse` and renders every
//! failure as one JSON envelope, [`ErrorBody`]. Internal failures are
//! logged server-side and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use polaris_core::ValidationIssues;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// JSON error response body shared by every endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message.
    pub detail: String,
    /// Machine-readable code (e.g. `invalid_payload`, `tts_error`).
    pub code: String,
    /// Field-level validation issues, present only for `invalid_payload`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<ValidationIssues>,
    /// Provider error payload, present only for `tts_error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body failed validation (400).
    #[error("invalid request payload: {0}")]
    InvalidPayload(ValidationIssues),

    /// The compatibility service rejected the request (its 4xx status).
    #[error("upstream rejected request with {status}: {detail}")]
    UpstreamRejected { status: StatusCode, detail: String },

    /// No text-to-speech key is configured (503).
    #[error("text-to-speech API key is not configured")]
    MissingApiKey,

    /// The text-to-speech provider answered with an error status.
    #[error("text-to-speech provider returned {status}")]
    TtsError {
        status: StatusCode,
        details: Option<serde_json::Value>,
    },

    /// The text-to-speech provider could not be reached (502).
    #[error("text-to-speech provider unavailable: {0}")]
    TtsUnavailable(String),

    /// Anything unexpected (500). The message is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "invalid_payload"),
            Self::UpstreamRejected { status, .. } => (*status, "upstream_rejected"),
            Self::MissingApiKey => (StatusCode::SERVICE_UNAVAILABLE, "missing_api_key"),
            Self::TtsError { status, .. } => (*status, "tts_error"),
            Self::TtsUnavailable(_) => (StatusCode::BAD_GATEWAY, "tts_unavailable"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl From<ValidationIssues> for AppError {
    fn from(issues: ValidationIssues) -> Self {
        Self::InvalidPayload(issues)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::TtsUnavailable(_) => tracing::error!(error = %self, "speech provider unreachable"),
            Self::MissingApiKey => tracing::warn!("narration requested without a configured API key"),
            Self::UpstreamRejected { .. } | Self::TtsError { .. } => {
                tracing::warn!(error = %self, "upstream error passed through")
            }
            Self::InvalidPayload(_) => {}
        }

        let body = match self {
            Self::InvalidPayload(issues) => ErrorBody {
                detail: "Invalid request payload.".into(),
                code: code.into(),
                issues: Some(issues),
                details: None,
            },
            Self::UpstreamRejected { detail, .. } => ErrorBody {
                detail,
                code: code.into(),
                issues: None,
                details: None,
            },
            Self::MissingApiKey => ErrorBody {
                detail: "Voice narration service is not configured".into(),
                code: code.into(),
                issues: None,
                details: None,
            },
            Self::TtsError { details, .. } => ErrorBody {
                detail: "Failed to generate voice narration".into(),
                code: code.into(),
                issues: None,
                details: Some(details.unwrap_or(serde_json::Value::Null)),
            },
            Self::TtsUnavailable(_) => ErrorBody {
                detail: "Voice narration service is unavailable".into(),
                code: code.into(),
                issues: None,
                details: None,
            },
            Self::Internal(_) => ErrorBody {
                detail: "An internal error occurred".into(),
                code: code.into(),
                issues: None,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
