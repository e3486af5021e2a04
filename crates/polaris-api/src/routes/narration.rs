//! # Voice Narration Endpoint
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/api/voice/narration` | `narrate` |
//!
//! The provider key is checked before the body is validated, so an
//! unconfigured deployment answers 503 for every request.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use polaris_client::UpstreamError;
use polaris_core::NarrationRequest;
use serde_json::Value;

use crate::error::AppError;
use crate::extractors::extract_payload;
use crate::state::AppState;

const X_VOICE_MODEL: HeaderName = HeaderName::from_static("x-voice-model");
const X_VOICE_ID: HeaderName = HeaderName::from_static("x-voice-id");
const X_VOICE_OUTPUT_FORMAT: HeaderName = HeaderName::from_static("x-voice-output-format");

/// Build the narration router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/voice/narration", post(narrate))
}

/// POST /api/voice/narration: Synthesize narration audio.
#[utoipa::path(
    post,
    path = "/api/voice/narration",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Audio bytes in the resolved output format"),
        (status = 400, description = "Invalid request payload", body = crate::error::ErrorBody),
        (status = 502, description = "Provider unreachable", body = crate::error::ErrorBody),
        (status = 503, description = "Provider key not configured", body = crate::error::ErrorBody),
    ),
    tag = "voice"
)]
pub(crate) async fn narrate(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let speech = state.speech.clone().ok_or(AppError::MissingApiKey)?;
    let request: NarrationRequest = extract_payload(body)?;
    let narration = request.resolve(&state.narration_defaults);

    let audio = speech.synthesize(&narration).await.map_err(|err| {
        state.metrics.record_upstream_failure("speech", err.kind());
        provider_error(err)
    })?;

    tracing::info!(
        voice_id = %narration.voice_id,
        model_id = %narration.model_id,
        output_format = %narration.output_format,
        bytes = audio.bytes.len(),
        "narration synthesized"
    );

    let headers = [
        (CONTENT_TYPE, header_value(&audio.content_type)?),
        (CACHE_CONTROL, HeaderValue::from_static("no-store")),
        (X_VOICE_MODEL, header_value(&narration.model_id)?),
        (X_VOICE_ID, header_value(&narration.voice_id)?),
        (
            X_VOICE_OUTPUT_FORMAT,
            HeaderValue::from_static(narration.output_format.as_str()),
        ),
    ];
    Ok((StatusCode::OK, headers, audio.bytes).into_response())
}

fn provider_error(err: UpstreamError) -> AppError {
    match err {
        UpstreamError::Status { status, body, .. } => AppError::TtsError {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            details: body,
        },
        other => AppError::TtsUnavailable(other.to_string()),
    }
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|_| AppError::Internal(format!("value not representable as a header: {value:?}")))
}
