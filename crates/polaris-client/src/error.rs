//! Upstream client error types.

use serde_json::Value;

/// Failure talking to an upstream service.
///
/// Callers decide what each variant means for them: the compatibility
/// route falls back on anything but a 4xx rejection, the narration route
/// surfaces everything.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// No response within the configured timeout.
    #[error("{endpoint} timed out after {elapsed_ms}ms")]
    Timeout { endpoint: String, elapsed_ms: u64 },

    /// Connection refused, DNS failure, reset, or similar.
    #[error("{endpoint} unreachable: {reason}")]
    Transport { endpoint: String, reason: String },

    /// Upstream answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: u16,
        /// Parsed JSON body, when the body was JSON.
        body: Option<Value>,
    },

    /// Upstream answered 2xx with a body that is not JSON.
    #[error("{endpoint} returned an unreadable body: {reason}")]
    Malformed { endpoint: String, reason: String },
}

impl UpstreamError {
    /// HTTP status the upstream answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the upstream explicitly rejected the request (4xx).
    pub fn is_rejection(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
            Self::Status { status, .. } if (400..=499).contains(status) => "rejected",
            Self::Status { status, .. } if (500..=599).contains(status) => "server_error",
            Self::Status { .. } => "unexpected_status",
            Self::Malformed { .. } => "malformed",
        }
    }

    /// Best-effort human-readable detail for a status failure.
    ///
    /// Uses the body's `detail` field verbatim when it is a string, its
    /// compact JSON when it is any other value, and otherwise a generic
    /// `Request failed with status code <n>`.
    pub fn detail(&self) -> String {
        match self {
            Self::Status { status, body, .. } => match body.as_ref().and_then(|b| b.get("detail")) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => format!("Request failed with status code {status}"),
                Some(other) => other.to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// Failure building a client from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A header value (typically the API key) contains invalid characters.
    #[error("invalid header value for {header}")]
    InvalidHeader { header: &'static str },

    /// reqwest refused to build the client.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A base URL cannot be joined with the endpoint path.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}
