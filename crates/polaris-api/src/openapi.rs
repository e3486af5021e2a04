//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented routes into one document served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the gateway.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Polaris Licensing Gateway",
        version = "0.1.0",
        description = "Server layer of the Polaris business-licensing portal.\n\nProvides:\n- **Activity compatibility** scoring, proxied to the scoring service with a deterministic fallback when it is unavailable\n- **Voice narration** via a text-to-speech provider\n- **Investor assistant** scripted chat replies\n\nHealth probes live under `/health/*`; Prometheus metrics at `/metrics`."
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::trade_license::validate_compatibility,
        crate::routes::narration::narrate,
        crate::routes::assistant::generate,
    ),
    components(
        schemas(
            polaris_core::CompatibilityRequest,
            polaris_core::CompatibilityResponse,
            polaris_core::CompatibilityResult,
            polaris_core::Language,
            polaris_core::OutputFormat,
            polaris_core::ValidationIssues,
            polaris_core::ChatReply,
            polaris_core::ChatAction,
            polaris_core::assistant::InvestorData,
            polaris_core::assistant::Entrepreneur,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "trade-license", description = "Trade-name / business-activity compatibility"),
        (name = "voice", description = "Text-to-speech narration"),
        (name = "assistant", description = "Investor chat assistant"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Polaris Licensing Gateway");
    }

    #[test]
    fn spec_has_every_endpoint() {
        let spec = ApiDoc::openapi();
        for path in [
            "/api/v1/activity-compatibility/validate",
            "/api/voice/narration",
            "/api/generate",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn spec_has_error_schema() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components");
        assert!(components.schemas.contains_key("ErrorBody"));
        assert!(components.schemas.contains_key("CompatibilityResponse"));
    }
}
