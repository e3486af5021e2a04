//! # Activity Compatibility Contract
//!
//! Request and response types for trade-name / business-activity
//! compatibility scoring. The same contract is used whether a response
//! comes from the upstream scoring service or from the fallback
//! synthesizer in [`crate::fallback`].
//!
//! ## Invariants
//!
//! - A [`CompatibilityRequest`] can only be obtained through
//!   [`FromJsonPayload::from_json`]; once built it is immutable.
//! - [`CompatibilityResponse::from_results`] derives the aggregate counts
//!   from the result list, so
//!   `total_activities == results.len() == consistent + inconsistent`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::{FromJsonPayload, PayloadReader, ValidationIssues};

/// Language of the trade name and activity descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Arabic,
}

impl Language {
    /// Wire names of every accepted language.
    pub const NAMES: [&'static str; 2] = ["english", "arabic"];

    /// Wire name of this language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Arabic => "arabic",
        }
    }

    /// Parse a wire name. Matching is exact (lowercase).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "english" => Some(Self::English),
            "arabic" => Some(Self::Arabic),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated compatibility request.
///
/// Serializes to the shape the upstream scoring service expects, with
/// absent optional fields omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CompatibilityRequest {
    trade_name: String,
    business_activities: Vec<String>,
    language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_llm_judge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    llm_judge_threshold: Option<f64>,
}

impl CompatibilityRequest {
    pub fn trade_name(&self) -> &str {
        &self.trade_name
    }

    pub fn business_activities(&self) -> &[String] {
        &self.business_activities
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Caller-supplied consistency threshold, if any.
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    pub fn embedding_model(&self) -> Option<&str> {
        self.embedding_model.as_deref()
    }

    pub fn embedding_provider(&self) -> Option<&str> {
        self.embedding_provider.as_deref()
    }

    pub fn enable_llm_judge(&self) -> Option<bool> {
        self.enable_llm_judge
    }

    pub fn llm_judge_threshold(&self) -> Option<f64> {
        self.llm_judge_threshold
    }
}

impl FromJsonPayload for CompatibilityRequest {
    fn from_json(value: &serde_json::Value) -> Result<Self, ValidationIssues> {
        let mut reader = PayloadReader::new(value)?;

        let trade_name = reader.required_string("trade_name", "Trade name is required");
        let business_activities = reader.required_string_list("business_activities");
        let language = reader.required_enum("language", Language::parse, &Language::NAMES);
        let threshold = reader.optional_unit_interval("threshold");
        let embedding_model = reader.optional_string("embedding_model", false);
        let embedding_provider = reader.optional_string("embedding_provider", false);
        let enable_llm_judge = reader.optional_bool("enable_llm_judge");
        let llm_judge_threshold = reader.optional_unit_interval("llm_judge_threshold");

        let issues = reader.into_issues();
        match (trade_name, business_activities, language) {
            (Some(trade_name), Some(business_activities), Some(language)) if issues.is_empty() => {
                Ok(Self {
                    trade_name,
                    business_activities,
                    language,
                    threshold,
                    embedding_model,
                    embedding_provider,
                    enable_llm_judge,
                    llm_judge_threshold,
                })
            }
            _ => Err(issues),
        }
    }
}

/// Compatibility verdict for one business activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CompatibilityResult {
    pub activity_description: String,
    /// Score in `[0, 1]`.
    pub compatibility_score: f64,
    pub is_consistent: bool,
    pub reason: String,
    pub threshold: f64,
}

/// Envelope returned by the compatibility endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CompatibilityResponse {
    pub trade_name: String,
    pub language: Language,
    pub results: Vec<CompatibilityResult>,
    pub total_activities: usize,
    pub consistent_activities: usize,
    pub inconsistent_activities: usize,
    pub threshold_used: f64,
    /// Free-form LLM judge output, `null` when no judge ran.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub llm_judgment: Option<serde_json::Value>,
}

impl CompatibilityResponse {
    /// Build a response, deriving the aggregate counts from `results`.
    pub fn from_results(
        trade_name: impl Into<String>,
        language: Language,
        results: Vec<CompatibilityResult>,
        threshold_used: f64,
    ) -> Self {
        let consistent_activities = results.iter().filter(|r| r.is_consistent).count();
        Self {
            trade_name: trade_name.into(),
            language,
            total_activities: results.len(),
            consistent_activities,
            inconsistent_activities: results.len() - consistent_activities,
            results,
            threshold_used,
            llm_judgment: None,
        }
    }
}
