//! # Application State
//!
//! Shared state handed to every handler: the upstream clients behind their
//! traits, the narration defaults, the fallback policy, and metrics.

use std::sync::Arc;

use polaris_client::{
    CompatibilityService, ConfigError, ElevenLabsClient, HttpCompatibilityClient,
    SpeechSynthesizer,
};
use polaris_core::{FallbackPolicy, NarrationDefaults};

use crate::config::AppConfig;
use crate::middleware::metrics::ApiMetrics;

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub compatibility: Arc<dyn CompatibilityService>,
    /// `None` when no text-to-speech key is configured.
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub narration_defaults: Arc<NarrationDefaults>,
    pub fallback: FallbackPolicy,
    pub metrics: ApiMetrics,
    pub metrics_enabled: bool,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("speech_configured", &self.speech.is_some())
            .field("narration_defaults", &self.narration_defaults)
            .field("fallback", &self.fallback)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State with the given compatibility service, no speech provider, and
    /// default policy and narration settings.
    pub fn new(compatibility: Arc<dyn CompatibilityService>) -> Self {
        Self {
            compatibility,
            speech: None,
            narration_defaults: Arc::new(NarrationDefaults::default()),
            fallback: FallbackPolicy::default(),
            metrics: ApiMetrics::new(),
            metrics_enabled: true,
        }
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_narration_defaults(mut self, defaults: NarrationDefaults) -> Self {
        self.narration_defaults = Arc::new(defaults);
        self
    }

    pub fn with_fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = policy;
        self
    }

    pub fn with_metrics_enabled(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Build production state: real HTTP clients from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let compatibility = HttpCompatibilityClient::new(config.compatibility.clone())?;
        tracing::info!(endpoint = %compatibility.endpoint(), "compatibility upstream configured");

        let mut state = Self::new(Arc::new(compatibility))
            .with_narration_defaults(config.narration_defaults.clone())
            .with_fallback(config.fallback)
            .with_metrics_enabled(config.metrics_enabled);

        match &config.speech {
            Some(speech) => {
                state = state.with_speech(Arc::new(ElevenLabsClient::new(speech.clone())?));
                tracing::info!(base_url = %speech.base_url, "speech provider configured");
            }
            None => tracing::warn!("ELEVENLABS_API_KEY not set; narration will answer 503"),
        }

        Ok(state)
    }
}
