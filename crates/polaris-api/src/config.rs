//! # Runtime Configuration
//!
//! [`Cli`] is the command line of the `polaris-api` binary; every flag can
//! also be set from the environment. [`Cli::into_config`] folds it into an
//! [`AppConfig`], which is the only configuration the application sees.

use std::net::SocketAddr;

use clap::{ArgAction, Parser};
use polaris_client::{CompatibilityConfig, SpeechConfig};
use polaris_core::fallback::{self, FallbackPolicy, PolicyError};
use polaris_core::{NarrationDefaults, OutputFormat};
use url::Url;

/// Command line and environment for the gateway binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "polaris-api", version, about = "Polaris licensing portal gateway")]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "POLARIS_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Emit logs as JSON lines.
    #[arg(long, env = "POLARIS_LOG_JSON", action = ArgAction::Set, default_value_t = false)]
    pub log_json: bool,

    /// Serve `/metrics` and record request metrics.
    #[arg(long, env = "POLARIS_METRICS_ENABLED", action = ArgAction::Set, default_value_t = true)]
    pub metrics_enabled: bool,

    /// Base URL of the activity-compatibility scoring service.
    #[arg(long, env = "TRADE_LICENSE_API_BASE_URL", default_value = "http://127.0.0.1:8000")]
    pub trade_license_api_base_url: Url,

    /// Timeout for compatibility requests, in seconds.
    #[arg(long, env = "TRADE_LICENSE_API_TIMEOUT_SECS", default_value_t = 15)]
    pub trade_license_api_timeout_secs: u64,

    /// Text-to-speech API key. Narration answers 503 when unset.
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    pub elevenlabs_api_key: Option<String>,

    /// Text-to-speech provider base URL.
    #[arg(long, env = "ELEVENLABS_API_BASE_URL", default_value = polaris_client::speech::ELEVENLABS_BASE_URL)]
    pub elevenlabs_api_base_url: Url,

    /// Default voice when a request names none.
    #[arg(long, env = "ELEVENLABS_VOICE_ID")]
    pub elevenlabs_voice_id: Option<String>,

    /// Default synthesis model when a request names none.
    #[arg(long, env = "ELEVENLABS_MODEL_ID")]
    pub elevenlabs_model_id: Option<String>,

    /// Default output format; unknown values are ignored.
    #[arg(long, env = "ELEVENLABS_OUTPUT_FORMAT")]
    pub elevenlabs_output_format: Option<String>,

    /// Timeout for speech synthesis, in seconds.
    #[arg(long, env = "ELEVENLABS_TIMEOUT_SECS", default_value_t = 30)]
    pub elevenlabs_timeout_secs: u64,

    /// Lowest score a synthesized result can get.
    #[arg(long, env = "POLARIS_FALLBACK_MIN_SCORE", default_value_t = fallback::MIN_SCORE)]
    pub fallback_min_score: f64,

    /// Score of the first activity in a synthesized response.
    #[arg(long, env = "POLARIS_FALLBACK_BASE_SCORE", default_value_t = fallback::BASE_SCORE)]
    pub fallback_base_score: f64,

    /// Score decrement per activity position.
    #[arg(long, env = "POLARIS_FALLBACK_SCORE_STEP", default_value_t = fallback::SCORE_STEP)]
    pub fallback_score_step: f64,

    /// Consistency threshold for synthesized results.
    #[arg(long, env = "POLARIS_FALLBACK_THRESHOLD", default_value_t = fallback::FALLBACK_THRESHOLD)]
    pub fallback_threshold: f64,
}

/// Everything the application needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub metrics_enabled: bool,
    pub compatibility: CompatibilityConfig,
    /// `None` when no API key is configured.
    pub speech: Option<SpeechConfig>,
    pub narration_defaults: NarrationDefaults,
    pub fallback: FallbackPolicy,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Cli {
    /// Validate and fold the command line into an [`AppConfig`].
    pub fn into_config(self) -> Result<AppConfig, PolicyError> {
        let fallback = FallbackPolicy::new(
            self.fallback_min_score,
            self.fallback_base_score,
            self.fallback_score_step,
            self.fallback_threshold,
        )?;

        let output_format = non_empty(self.elevenlabs_output_format).and_then(|raw| {
            let parsed = OutputFormat::parse(&raw);
            if parsed.is_none() {
                tracing::warn!(
                    value = %raw,
                    allowed = ?OutputFormat::NAMES,
                    "ignoring unknown ELEVENLABS_OUTPUT_FORMAT"
                );
            }
            parsed
        });

        let speech = non_empty(self.elevenlabs_api_key).map(|key| SpeechConfig {
            timeout_secs: self.elevenlabs_timeout_secs,
            ..SpeechConfig::new(self.elevenlabs_api_base_url, key)
        });

        Ok(AppConfig {
            bind: self.bind,
            metrics_enabled: self.metrics_enabled,
            compatibility: CompatibilityConfig {
                base_url: self.trade_license_api_base_url,
                timeout_secs: self.trade_license_api_timeout_secs,
            },
            speech,
            narration_defaults: NarrationDefaults {
                voice_id: non_empty(self.elevenlabs_voice_id),
                model_id: non_empty(self.elevenlabs_model_id),
                output_format,
            },
            fallback,
        })
    }
}
