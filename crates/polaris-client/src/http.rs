//! Shared request plumbing for the upstream clients.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::error::{ConfigError, UpstreamError};

/// Build a `reqwest::Client` with a total request timeout and JSON
/// content type, plus any extra default headers.
pub(crate) fn build_client(
    timeout: Duration,
    mut headers: HeaderMap,
) -> Result<reqwest::Client, ConfigError> {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}

/// Join `path` onto `base`, keeping any path prefix `base` already has.
pub(crate) fn endpoint_url(base: &Url, path: &str) -> Result<Url, ConfigError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(Url::parse(&joined)?)
}

/// Send `request`, classifying transport failures. Any HTTP status is
/// returned as `Ok`; status handling is the caller's job.
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    endpoint: &str,
    timeout: Duration,
) -> Result<reqwest::Response, UpstreamError> {
    request.send().await.map_err(|e| {
        if e.is_timeout() {
            UpstreamError::Timeout {
                endpoint: endpoint.to_string(),
                elapsed_ms: timeout.as_millis() as u64,
            }
        } else {
            UpstreamError::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        }
    })
}

/// Turn a non-2xx response into [`UpstreamError::Status`], keeping the
/// body when it parses as JSON.
pub(crate) async fn status_error(response: reqwest::Response, endpoint: &str) -> UpstreamError {
    let status = response.status().as_u16();
    let body = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
        Err(_) => None,
    };
    UpstreamError::Status {
        endpoint: endpoint.to_string(),
        status,
        body,
    }
}

/// Read body bytes, mapping a body timeout the same way as a send timeout.
pub(crate) async fn body_bytes(
    response: reqwest::Response,
    endpoint: &str,
    timeout: Duration,
) -> Result<Vec<u8>, UpstreamError> {
    match response.bytes().await {
        Ok(bytes) => Ok(bytes.to_vec()),
        Err(e) if e.is_timeout() => Err(UpstreamError::Timeout {
            endpoint: endpoint.to_string(),
            elapsed_ms: timeout.as_millis() as u64,
        }),
        Err(e) => Err(UpstreamError::Transport {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }),
    }
}
