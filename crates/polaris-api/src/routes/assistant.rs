//! # Investor Assistant Endpoint
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/api/generate` | `generate` |

use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use polaris_core::{assistant, ChatReply, ChatRequest};
use serde_json::Value;

use crate::error::AppError;
use crate::extractors::extract_payload;
use crate::state::AppState;

/// Build the assistant router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate", post(generate))
}

/// POST /api/generate: Scripted reply for the portal chat widget.
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Chat reply", body = ChatReply),
        (status = 400, description = "Invalid request payload", body = crate::error::ErrorBody),
    ),
    tag = "assistant"
)]
pub(crate) async fn generate(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let request: ChatRequest = extract_payload(body)?;
    Ok(Json(assistant::respond(&request)))
}
