//! # polaris-api: Axum Gateway for the Licensing Portal
//!
//! Server layer of the Polaris business-licensing portal. Request
//! validation and fallback scoring live in `polaris-core`; upstream calls
//! go through `polaris-client`.
//!
//! ## API Surface
//!
//! | Path | Module | Purpose |
//! |------|--------|---------|
//! | `POST /api/v1/activity-compatibility/validate` | [`routes::trade_license`] | Compatibility proxy with fallback |
//! | `POST /api/trade-license/validate` | [`routes::trade_license`] | Same handler, portal path |
//! | `POST /api/voice/narration` | [`routes::narration`] | Text-to-speech proxy |
//! | `POST /api/generate` | [`routes::assistant`] | Investor assistant |
//! | `GET /health/liveness`, `/health/readiness` | this module | Probes |
//! | `GET /metrics` | this module | Prometheus exposition |
//! | `GET /openapi.json` | [`openapi`] | OpenAPI document |
//!
//! ## Middleware Stack (outermost first)
//!
//! ```text
//! CorsLayer → CatchPanicLayer → TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::any::Any;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Request body limit for every API route.
const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Assemble the full application router.
///
/// Health probes and `/metrics` sit outside the request-metrics layer so
/// scrapes do not count themselves.
pub fn app(state: AppState) -> Router {
    let metrics_on = state.metrics_enabled;
    let metrics = state.metrics.clone();

    let mut api = Router::new()
        .merge(routes::trade_license::router())
        .merge(routes::narration::router())
        .merge(routes::assistant::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES));

    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let mut probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    if metrics_on {
        probes = probes
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    Router::new()
        .merge(probes.with_state(state))
        .merge(api)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    AppError::Internal(format!("handler panicked: {message}")).into_response()
}

/// GET /health/liveness
async fn liveness() -> &'static str {
    "ok"
}

/// GET /health/readiness
///
/// The gateway holds no connections, so it is ready once it is serving.
async fn readiness() -> &'static str {
    "ready"
}

/// GET /metrics: Prometheus text exposition.
async fn prometheus_metrics(Extension(metrics): Extension<ApiMetrics>) -> impl IntoResponse {
    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => AppError::Internal(e).into_response(),
    }
}
