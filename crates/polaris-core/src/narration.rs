//! # Voice Narration Requests
//!
//! Validation and parameter resolution for text-to-speech narration. A
//! [`NarrationRequest`] carries only what the caller chose to override;
//! [`NarrationRequest::resolve`] fills the gaps from deployment defaults
//! and then from built-in defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::{FromJsonPayload, PayloadReader, ValidationIssues};

/// Built-in voice when neither the request nor the deployment names one.
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
/// Built-in synthesis model.
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";
/// Built-in output format.
pub const DEFAULT_OUTPUT_FORMAT: OutputFormat = OutputFormat::Mp3_44100_192;

/// Audio encodings the provider is allowed to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[allow(non_camel_case_types)]
pub enum OutputFormat {
    #[serde(rename = "mp3_44100_192")]
    Mp3_44100_192,
    #[serde(rename = "mp3_44100_128")]
    Mp3_44100_128,
    #[serde(rename = "mp3_44100_64")]
    Mp3_44100_64,
    #[serde(rename = "ogg_48000")]
    Ogg_48000,
    #[serde(rename = "pcm_44100")]
    Pcm_44100,
}

impl OutputFormat {
    /// Wire names of every allowed format.
    pub const NAMES: [&'static str; 5] = [
        "mp3_44100_192",
        "mp3_44100_128",
        "mp3_44100_64",
        "ogg_48000",
        "pcm_44100",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3_44100_192 => "mp3_44100_192",
            Self::Mp3_44100_128 => "mp3_44100_128",
            Self::Mp3_44100_64 => "mp3_44100_64",
            Self::Ogg_48000 => "ogg_48000",
            Self::Pcm_44100 => "pcm_44100",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mp3_44100_192" => Some(Self::Mp3_44100_192),
            "mp3_44100_128" => Some(Self::Mp3_44100_128),
            "mp3_44100_64" => Some(Self::Mp3_44100_64),
            "ogg_48000" => Some(Self::Ogg_48000),
            "pcm_44100" => Some(Self::Pcm_44100),
            _ => None,
        }
    }

    /// MIME type of audio in this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3_44100_192 | Self::Mp3_44100_128 | Self::Mp3_44100_64 => "audio/mpeg",
            Self::Ogg_48000 => "audio/ogg",
            Self::Pcm_44100 => "audio/wav",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller overrides for individual voice settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VoiceSettingsOverrides {
    pub stability: Option<f64>,
    pub similarity_boost: Option<f64>,
    pub style: Option<f64>,
    pub use_speaker_boost: Option<bool>,
}

impl VoiceSettingsOverrides {
    const FIELDS: [&'static str; 4] = ["stability", "similarityBoost", "style", "useSpeakerBoost"];

    fn read(reader: &mut PayloadReader<'_>) -> Self {
        reader.reject_unknown_keys(&Self::FIELDS);
        Self {
            stability: reader.optional_unit_interval("stability"),
            similarity_boost: reader.optional_unit_interval("similarityBoost"),
            style: reader.optional_unit_interval("style"),
            use_speaker_boost: reader.optional_bool("useSpeakerBoost"),
        }
    }
}

/// Voice settings sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.32,
            similarity_boost: 0.9,
            style: 0.58,
            use_speaker_boost: true,
        }
    }
}

impl VoiceSettings {
    /// Apply every override that is present.
    pub fn with_overrides(self, overrides: &VoiceSettingsOverrides) -> Self {
        Self {
            stability: overrides.stability.unwrap_or(self.stability),
            similarity_boost: overrides.similarity_boost.unwrap_or(self.similarity_boost),
            style: overrides.style.unwrap_or(self.style),
            use_speaker_boost: overrides.use_speaker_boost.unwrap_or(self.use_speaker_boost),
        }
    }
}

/// A validated narration request.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationRequest {
    pub text: String,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub voice_settings: Option<VoiceSettingsOverrides>,
}

impl FromJsonPayload for NarrationRequest {
    fn from_json(value: &serde_json::Value) -> Result<Self, ValidationIssues> {
        let mut reader = PayloadReader::new(value)?;

        let text = reader.required_string("text", "Narration text is required");
        let voice_id = reader
            .optional_string("voiceId", true)
            .filter(|id| match id.as_str() {
                "." | ".." => {
                    reader.issue("voiceId", "Voice id must not be a relative path segment");
                    false
                }
                _ => true,
            });
        let model_id = reader.optional_string("modelId", true);
        let output_format =
            reader.optional_enum("outputFormat", OutputFormat::parse, &OutputFormat::NAMES);
        let voice_settings = reader.optional_object("voiceSettings").map(|object| {
            let mut nested = PayloadReader::over(object);
            let overrides = VoiceSettingsOverrides::read(&mut nested);
            reader.absorb("voiceSettings", nested.into_issues());
            overrides
        });

        let issues = reader.into_issues();
        match text {
            Some(text) if issues.is_empty() => Ok(Self {
                text,
                voice_id,
                model_id,
                output_format,
                voice_settings,
            }),
            _ => Err(issues),
        }
    }
}

/// Deployment-level narration defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NarrationDefaults {
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub output_format: Option<OutputFormat>,
}

/// Fully resolved narration parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNarration {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: OutputFormat,
    pub voice_settings: VoiceSettings,
}

impl NarrationRequest {
    /// Resolve each parameter as request, then `defaults`, then built-in.
    pub fn resolve(self, defaults: &NarrationDefaults) -> ResolvedNarration {
        let voice_settings = match &self.voice_settings {
            Some(overrides) => VoiceSettings::default().with_overrides(overrides),
            None => VoiceSettings::default(),
        };
        ResolvedNarration {
            text: self.text,
            voice_id: self
                .voice_id
                .or_else(|| defaults.voice_id.clone())
                .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            model_id: self
                .model_id
                .or_else(|| defaults.model_id.clone())
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            output_format: self
                .output_format
                .or(defaults.output_format)
                .unwrap_or(DEFAULT_OUTPUT_FORMAT),
            voice_settings,
        }
    }
}
