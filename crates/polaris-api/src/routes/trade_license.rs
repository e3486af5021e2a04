//! # Activity Compatibility Endpoint
//!
//! Validates a compatibility request, forwards it upstream, and answers
//! HTTP 200 whether the body came from the upstream scorer or from the
//! fallback synthesizer.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/api/v1/activity-compatibility/validate` | `validate_compatibility` |
//! | `POST` | `/api/trade-license/validate` | `validate_compatibility` |
//!
//! ## Outcomes
//!
//! | Upstream result | Response |
//! |-----------------|----------|
//! | 2xx with JSON | 200, upstream body verbatim |
//! | 4xx | upstream status, `upstream_rejected` with its detail |
//! | 5xx, timeout, unreachable, non-JSON 2xx, other status | 200, synthesized |

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use polaris_client::UpstreamError;
use polaris_core::{CompatibilityRequest, CompatibilityResponse};
use serde_json::Value;

use crate::error::AppError;
use crate::extractors::extract_payload;
use crate::state::AppState;

/// Build the compatibility router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/activity-compatibility/validate",
            post(validate_compatibility),
        )
        .route("/api/trade-license/validate", post(validate_compatibility))
}

/// Where a successful compatibility answer came from.
///
/// Both variants render identically: HTTP 200 with a JSON body.
#[derive(Debug)]
pub enum CompatibilityOutcome {
    Upstream(Value),
    Synthesized(CompatibilityResponse),
}

impl IntoResponse for CompatibilityOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Upstream(body) => (StatusCode::OK, Json(body)).into_response(),
            Self::Synthesized(body) => (StatusCode::OK, Json(body)).into_response(),
        }
    }
}

/// POST /api/v1/activity-compatibility/validate: Score activities against a trade name.
#[utoipa::path(
    post,
    path = "/api/v1/activity-compatibility/validate",
    request_body = CompatibilityRequest,
    responses(
        (status = 200, description = "Compatibility verdicts (upstream or synthesized)", body = CompatibilityResponse),
        (status = 400, description = "Invalid request payload", body = crate::error::ErrorBody),
        (status = 422, description = "Upstream rejected the request", body = crate::error::ErrorBody),
        (status = 500, description = "Unexpected failure", body = crate::error::ErrorBody),
    ),
    tag = "trade-license"
)]
pub(crate) async fn validate_compatibility(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<CompatibilityOutcome, AppError> {
    let request: CompatibilityRequest = extract_payload(body).inspect_err(|_| {
        state.metrics.record_compatibility_outcome("invalid");
    })?;

    match state.compatibility.validate(&request).await {
        Ok(body) => {
            state.metrics.record_compatibility_outcome("upstream");
            Ok(CompatibilityOutcome::Upstream(body))
        }
        Err(err) if err.is_rejection() => {
            state.metrics.record_compatibility_outcome("rejected");
            Err(rejection(&err))
        }
        Err(err) => {
            tracing::warn!(
                kind = err.kind(),
                error = %err,
                activities = request.business_activities().len(),
                "compatibility upstream unavailable, synthesizing fallback"
            );
            state
                .metrics
                .record_upstream_failure("compatibility", err.kind());
            state.metrics.record_compatibility_outcome("fallback");
            Ok(CompatibilityOutcome::Synthesized(
                state.fallback.synthesize(&request),
            ))
        }
    }
}

fn rejection(err: &UpstreamError) -> AppError {
    let status = err
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    AppError::UpstreamRejected {
        status,
        detail: err.detail(),
    }
}
