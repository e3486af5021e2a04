//! # Text-to-Speech Client
//!
//! [`SpeechSynthesizer`] turns a [`ResolvedNarration`] into audio bytes.
//! [`ElevenLabsClient`] is the production implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use polaris_core::narration::VoiceSettings;
use polaris_core::ResolvedNarration;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use url::Url;
use zeroize::Zeroizing;

use crate::error::{ConfigError, UpstreamError};
use crate::http;

/// Default provider base URL.
pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";

const SYNTHESIS_PATH: &str = "v1/text-to-speech";

/// Provider configuration. The API key is zeroized on drop and never
/// printed by `Debug`.
#[derive(Clone)]
pub struct SpeechConfig {
    pub base_url: Url,
    pub api_key: Zeroizing<String>,
    /// Total request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl SpeechConfig {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: Zeroizing::new(api_key.into()),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Synthesized audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Something that can speak a narration.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, narration: &ResolvedNarration) -> Result<SpeechAudio, UpstreamError>;
}

#[derive(Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    model_id: &'a str,
    output_format: &'static str,
    voice_settings: &'a VoiceSettings,
}

/// ElevenLabs text-to-speech over HTTP.
pub struct ElevenLabsClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl fmt::Debug for ElevenLabsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevenLabsClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ElevenLabsClient {
    pub fn new(config: SpeechConfig) -> Result<Self, ConfigError> {
        let mut key = HeaderValue::from_str(config.api_key.as_str())
            .map_err(|_| ConfigError::InvalidHeader { header: "xi-api-key" })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("xi-api-key", key);

        let timeout = Duration::from_secs(config.timeout_secs);
        Ok(Self {
            client: http::build_client(timeout, headers)?,
            base_url: config.base_url,
            timeout,
        })
    }
}

/// Provider URL for `voice_id`. The id is always one percent-encoded path
/// segment under the synthesis path.
fn synthesis_url(base: &Url, voice_id: &str) -> Result<Url, String> {
    if matches!(voice_id, "" | "." | "..") {
        return Err(format!("voice id {voice_id:?} is not a path segment"));
    }
    let mut url = http::endpoint_url(base, SYNTHESIS_PATH).map_err(|e| e.to_string())?;
    url.path_segments_mut()
        .map_err(|()| format!("base URL {base} cannot carry a path"))?
        .push(voice_id);
    Ok(url)
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, narration: &ResolvedNarration) -> Result<SpeechAudio, UpstreamError> {
        let url = synthesis_url(&self.base_url, &narration.voice_id).map_err(|reason| {
            UpstreamError::Malformed {
                endpoint: format!("POST /{SYNTHESIS_PATH}"),
                reason,
            }
        })?;
        let label = format!("POST {}", url.path());
        let accept = narration.output_format.content_type();

        let body = SynthesisBody {
            text: &narration.text,
            model_id: &narration.model_id,
            output_format: narration.output_format.as_str(),
            voice_settings: &narration.voice_settings,
        };

        tracing::debug!(
            voice_id = %narration.voice_id,
            model_id = %narration.model_id,
            output_format = %narration.output_format,
            chars = narration.text.chars().count(),
            "requesting speech synthesis"
        );

        let response = http::send(
            self.client
                .post(url)
                .header(ACCEPT, HeaderValue::from_static(accept))
                .json(&body),
            &label,
            self.timeout,
        )
        .await?;

        if !response.status().is_success() {
            return Err(http::status_error(response, &label).await);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(accept)
            .to_string();
        let bytes = http::body_bytes(response, &label, self.timeout).await?;

        Ok(SpeechAudio {
            bytes,
            content_type,
        })
    }
}
