//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded by
//! [`metrics_middleware`]. Domain counters are recorded by the handlers:
//!
//! - `polaris_compatibility_outcomes_total{outcome}` with outcome one of
//!   `upstream`, `fallback`, `rejected`, `invalid`.
//! - `polaris_upstream_failures_total{service,kind}` with service
//!   `compatibility` or `speech` and kind from
//!   [`polaris_client::UpstreamError::kind`].

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::core::Collector;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Label used for requests that matched no route.
const UNMATCHED_PATH: &str = "unmatched";

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    compatibility_outcomes_total: IntCounterVec,
    upstream_failures_total: IntCounterVec,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

fn counter(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    let metric = IntCounterVec::new(Opts::new(name, help), labels).expect("metric can be created");
    registry
        .register(Box::new(metric.clone()))
        .expect("metric can be registered");
    metric
}

fn sum(metric: &IntCounterVec) -> u64 {
    metric
        .collect()
        .iter()
        .flat_map(|mf| mf.get_metric())
        .map(|m| m.get_counter().get_value() as u64)
        .sum()
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = counter(
            &registry,
            "polaris_http_requests_total",
            "Total HTTP requests",
            &["method", "path", "status"],
        );

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "polaris_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 40.0,
            ]),
            &["method", "path"],
        )
        .expect("metric can be created");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("metric can be registered");

        let http_errors_total = counter(
            &registry,
            "polaris_http_errors_total",
            "Total HTTP errors (4xx and 5xx)",
            &["method", "path", "status"],
        );

        let compatibility_outcomes_total = counter(
            &registry,
            "polaris_compatibility_outcomes_total",
            "Compatibility requests by outcome",
            &["outcome"],
        );

        let upstream_failures_total = counter(
            &registry,
            "polaris_upstream_failures_total",
            "Upstream call failures by service and kind",
            &["service", "kind"],
        );

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                compatibility_outcomes_total,
                upstream_failures_total,
            }),
        }
    }

    /// Total request count across all labels.
    pub fn requests(&self) -> u64 {
        sum(&self.inner.http_requests_total)
    }

    /// Total error count across all labels.
    pub fn errors(&self) -> u64 {
        sum(&self.inner.http_errors_total)
    }

    /// Number of compatibility requests that ended with `outcome`.
    pub fn compatibility_outcomes(&self, outcome: &str) -> u64 {
        self.inner
            .compatibility_outcomes_total
            .with_label_values(&[outcome])
            .get()
    }

    /// Number of recorded `service` failures of `kind`.
    pub fn upstream_failures(&self, service: &str, kind: &str) -> u64 {
        self.inner
            .upstream_failures_total
            .with_label_values(&[service, kind])
            .get()
    }

    pub fn record_compatibility_outcome(&self, outcome: &str) {
        self.inner
            .compatibility_outcomes_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn record_upstream_failure(&self, service: &str, kind: &str) {
        self.inner
            .upstream_failures_total
            .with_label_values(&[service, kind])
            .inc();
    }

    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer).map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware that records HTTP request metrics.
///
/// Paths are labelled by their route template so label cardinality stays
/// bounded; unrouted requests share one label.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        m.record_request(&method, &path, response.status().as_u16(), duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let m = ApiMetrics::new();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
        assert_eq!(m.compatibility_outcomes("fallback"), 0);
    }

    #[test]
    fn request_and_error_counts_independent() {
        let m = ApiMetrics::new();
        for _ in 0..5 {
            m.record_request("POST", "/api/generate", 200, 0.01);
        }
        m.record_request("POST", "/api/voice/narration", 503, 0.1);
        m.record_request("POST", "/api/trade-license/validate", 400, 0.05);
        assert_eq!(m.requests(), 7);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn domain_counters() {
        let m = ApiMetrics::new();
        m.record_compatibility_outcome("fallback");
        m.record_compatibility_outcome("fallback");
        m.record_compatibility_outcome("upstream");
        m.record_upstream_failure("compatibility", "timeout");
        assert_eq!(m.compatibility_outcomes("fallback"), 2);
        assert_eq!(m.compatibility_outcomes("upstream"), 1);
        assert_eq!(m.upstream_failures("compatibility", "timeout"), 1);
        assert_eq!(m.upstream_failures("speech", "timeout"), 0);
    }

    #[test]
    fn clone_shares_underlying_counters() {
        let m = ApiMetrics::new();
        let clone = m.clone();
        m.record_request("GET", "/health/liveness", 200, 0.001);
        assert_eq!(clone.requests(), 1);
    }

    #[test]
    fn gather_and_encode_produces_text() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/metrics", 200, 0.01);
        m.record_compatibility_outcome("upstream");
        let output = m.gather_and_encode().unwrap();
        assert!(output.contains("polaris_http_requests_total"));
        assert!(output.contains("polaris_http_request_duration_seconds"));
        assert!(output.contains("polaris_compatibility_outcomes_total{outcome=\"upstream\"} 1"));
    }
}
