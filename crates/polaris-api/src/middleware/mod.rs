//! # Middleware Stack
//!
//! - [`metrics`]: Prometheus request and domain metrics.
//!
//! Request tracing uses `tower_http::trace::TraceLayer` directly, and
//! handler panics are converted to the standard 500 body by
//! `tower_http::catch_panic::CatchPanicLayer` in [`crate::app`].

pub mod metrics;
