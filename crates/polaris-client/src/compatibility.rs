//! # Activity Compatibility Client
//!
//! Forwards a validated [`CompatibilityRequest`] to the upstream scoring
//! service and hands back its JSON body untouched. There is no retry and
//! no response-shape validation; the gateway decides what to do with each
//! [`UpstreamError`].

use std::time::Duration;

use async_trait::async_trait;
use polaris_core::CompatibilityRequest;
use reqwest::header::HeaderMap;
use serde_json::Value;
use url::Url;

use crate::error::{ConfigError, UpstreamError};
use crate::http;

/// Path of the scoring endpoint, relative to the service base URL.
pub const VALIDATE_PATH: &str = "api/v1/activity-compatibility/validate";

/// Upstream scoring service configuration.
#[derive(Debug, Clone)]
pub struct CompatibilityConfig {
    /// Base URL of the scoring service (e.g. `http://localhost:8000`).
    pub base_url: Url,
    /// Total request timeout in seconds (default: 15).
    pub timeout_secs: u64,
}

impl CompatibilityConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout_secs: 15,
        }
    }
}

/// Something that can score a compatibility request.
#[async_trait]
pub trait CompatibilityService: Send + Sync {
    /// Score `request`, returning the upstream's JSON body on 2xx.
    async fn validate(&self, request: &CompatibilityRequest) -> Result<Value, UpstreamError>;
}

/// HTTP implementation of [`CompatibilityService`].
#[derive(Debug, Clone)]
pub struct HttpCompatibilityClient {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpCompatibilityClient {
    pub fn new(config: CompatibilityConfig) -> Result<Self, ConfigError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        Ok(Self {
            client: http::build_client(timeout, HeaderMap::new())?,
            endpoint: http::endpoint_url(&config.base_url, VALIDATE_PATH)?,
            timeout,
        })
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CompatibilityService for HttpCompatibilityClient {
    async fn validate(&self, request: &CompatibilityRequest) -> Result<Value, UpstreamError> {
        let label = format!("POST {}", self.endpoint.path());
        tracing::debug!(
            endpoint = %self.endpoint,
            activities = request.business_activities().len(),
            "forwarding compatibility request"
        );

        let response = http::send(
            self.client.post(self.endpoint.clone()).json(request),
            &label,
            self.timeout,
        )
        .await?;

        if !response.status().is_success() {
            return Err(http::status_error(response, &label).await);
        }

        let bytes = http::body_bytes(response, &label, self.timeout).await?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Malformed {
            endpoint: label,
            reason: e.to_string(),
        })
    }
}
