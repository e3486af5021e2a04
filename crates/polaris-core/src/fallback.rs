//! # Deterministic Fallback Scoring
//!
//! When the upstream compatibility service cannot answer, the gateway still
//! returns a well-formed [`CompatibilityResponse`]. Scores are a function of
//! list position only:
//!
//! ```text
//! score(i) = round2(max(min_score, base_score - i * score_step))
//! is_consistent(i) = score(i) >= threshold
//! ```
//!
//! With the default policy the first activity scores 0.90, each following
//! activity 0.06 less, floored at 0.62; the consistency threshold is 0.72
//! regardless of any threshold the caller asked for.
//!
//! Rounding happens before the threshold comparison so that e.g.
//! `0.90 - 3 * 0.06` compares equal to `0.72`.

use thiserror::Error;

use crate::compatibility::{CompatibilityRequest, CompatibilityResponse, CompatibilityResult};

/// Floor for synthesized scores.
pub const MIN_SCORE: f64 = 0.62;
/// Score of the first listed activity.
pub const BASE_SCORE: f64 = 0.90;
/// Decrement per list position.
pub const SCORE_STEP: f64 = 0.06;
/// Consistency threshold applied to synthesized scores.
pub const FALLBACK_THRESHOLD: f64 = 0.72;

/// Errors from constructing a [`FallbackPolicy`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// A score or threshold lies outside `[0, 1]`.
    #[error("{name} must lie in [0, 1], got {value}")]
    OutOfRange {
        /// Which parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The floor is above the starting score.
    #[error("min_score ({min}) must not exceed base_score ({base})")]
    Inverted {
        /// Configured floor.
        min: f64,
        /// Configured starting score.
        base: f64,
    },

    /// The per-position step is negative or not finite.
    #[error("score_step must be a finite non-negative number, got {0}")]
    InvalidStep(f64),
}

/// Scoring constants for synthesized compatibility results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPolicy {
    min_score: f64,
    base_score: f64,
    score_step: f64,
    threshold: f64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            min_score: MIN_SCORE,
            base_score: BASE_SCORE,
            score_step: SCORE_STEP,
            threshold: FALLBACK_THRESHOLD,
        }
    }
}

fn unit_interval(name: &'static str, value: f64) -> Result<f64, PolicyError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(PolicyError::OutOfRange { name, value })
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl FallbackPolicy {
    /// Build a policy from explicit constants.
    pub fn new(
        min_score: f64,
        base_score: f64,
        score_step: f64,
        threshold: f64,
    ) -> Result<Self, PolicyError> {
        let min_score = unit_interval("min_score", min_score)?;
        let base_score = unit_interval("base_score", base_score)?;
        let threshold = unit_interval("threshold", threshold)?;
        if !score_step.is_finite() || score_step < 0.0 {
            return Err(PolicyError::InvalidStep(score_step));
        }
        if min_score > base_score {
            return Err(PolicyError::Inverted {
                min: min_score,
                base: base_score,
            });
        }
        Ok(Self {
            min_score,
            base_score,
            score_step,
            threshold,
        })
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn score_step(&self) -> f64 {
        self.score_step
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Synthesized score for the activity at `index` (0-based).
    pub fn score_for(&self, index: usize) -> f64 {
        let raw = self.base_score - index as f64 * self.score_step;
        round2(raw.max(self.min_score))
    }

    /// Build a complete response for `request` without consulting any upstream.
    pub fn synthesize(&self, request: &CompatibilityRequest) -> CompatibilityResponse {
        let trade_name = request.trade_name();
        let results = request
            .business_activities()
            .iter()
            .enumerate()
            .map(|(i, activity)| {
                let score = self.score_for(i);
                let is_consistent = score >= self.threshold;
                CompatibilityResult {
                    activity_description: activity.clone(),
                    compatibility_score: score,
                    is_consistent,
                    reason: reason(trade_name, activity, is_consistent),
                    threshold: self.threshold,
                }
            })
            .collect();

        CompatibilityResponse::from_results(
            trade_name,
            request.language(),
            results,
            self.threshold,
        )
    }
}

fn reason(trade_name: &str, activity: &str, is_consistent: bool) -> String {
    if is_consistent {
        format!("\"{activity}\" is aligned with the trade name \"{trade_name}\".")
    } else {
        format!(
            "\"{activity}\" is partially aligned with the trade name \"{trade_name}\"; \
             consider refining the activity description."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::Language;
    use crate::validation::FromJsonPayload;
    use serde_json::json;

    fn request(activities: &[&str]) -> CompatibilityRequest {
        CompatibilityRequest::from_json(&json!({
            "trade_name": "Layla's Kitchen",
            "business_activities": activities,
            "language": "english",
            "threshold": 0.99
        }))
        .expect("valid request")
    }

    #[test]
    fn default_scores_step_down_and_floor() {
        let policy = FallbackPolicy::default();
        let scores: Vec<f64> = (0..7).map(|i| policy.score_for(i)).collect();
        assert_eq!(scores, vec![0.90, 0.84, 0.78, 0.72, 0.66, 0.62, 0.62]);
    }

    #[test]
    fn fourth_activity_sits_exactly_on_threshold() {
        let policy = FallbackPolicy::default();
        let resp = policy.synthesize(&request(&["a", "b", "c", "d", "e"]));
        assert_eq!(resp.results[3].compatibility_score, 0.72);
        assert!(resp.results[3].is_consistent);
        assert!(!resp.results[4].is_consistent);
        assert_eq!(resp.consistent_activities, 4);
        assert_eq!(resp.inconsistent_activities, 1);
    }

    #[test]
    fn layla_kitchen_example() {
        let resp = FallbackPolicy::default()
            .synthesize(&request(&["Full-service restaurant", "Charcoal BBQ"]));

        assert_eq!(resp.trade_name, "Layla's Kitchen");
        assert_eq!(resp.language, Language::English);
        assert_eq!(resp.total_activities, 2);
        assert_eq!(resp.threshold_used, 0.72);
        assert!(resp.llm_judgment.is_none());

        let first = &resp.results[0];
        assert_eq!(first.activity_description, "Full-service restaurant");
        assert_eq!(first.compatibility_score, 0.90);
        assert!(first.is_consistent);
        assert_eq!(first.threshold, 0.72);

        let second = &resp.results[1];
        assert_eq!(second.activity_description, "Charcoal BBQ");
        assert_eq!(second.compatibility_score, 0.84);
        assert!(second.is_consistent);
    }

    #[test]
    fn caller_threshold_is_ignored() {
        let resp = FallbackPolicy::default().synthesize(&request(&["a"]));
        assert_eq!(resp.threshold_used, FALLBACK_THRESHOLD);
        assert_eq!(resp.results[0].threshold, FALLBACK_THRESHOLD);
    }

    #[test]
    fn reasons_mention_trade_name_and_activity() {
        let resp = FallbackPolicy::default()
            .synthesize(&request(&["Cafe", "b", "c", "d", "Shisha lounge"]));
        let good = &resp.results[0].reason;
        assert!(good.contains("Cafe"));
        assert!(good.contains("Layla's Kitchen"));
        assert!(good.contains("is aligned"));

        let weak = &resp.results[4].reason;
        assert!(weak.contains("Shisha lounge"));
        assert!(weak.contains("partially aligned"));
    }

    #[test]
    fn custom_policy_is_applied() {
        let policy = FallbackPolicy::new(0.5, 0.8, 0.1, 0.65).unwrap();
        let resp = policy.synthesize(&request(&["a", "b", "c", "d", "e"]));
        let scores: Vec<f64> = resp.results.iter().map(|r| r.compatibility_score).collect();
        assert_eq!(scores, vec![0.8, 0.7, 0.6, 0.5, 0.5]);
        assert_eq!(resp.consistent_activities, 2);
        assert_eq!(resp.threshold_used, 0.65);
    }

    #[test]
    fn policy_rejects_bad_constants() {
        assert!(matches!(
            FallbackPolicy::new(1.2, 0.9, 0.06, 0.72),
            Err(PolicyError::OutOfRange { name: "min_score", .. })
        ));
        assert!(matches!(
            FallbackPolicy::new(0.9, 0.6, 0.06, 0.72),
            Err(PolicyError::Inverted { .. })
        ));
        assert!(matches!(
            FallbackPolicy::new(0.6, 0.9, -0.01, 0.72),
            Err(PolicyError::InvalidStep(_))
        ));
        assert!(matches!(
            FallbackPolicy::new(0.6, 0.9, f64::NAN, 0.72),
            Err(PolicyError::InvalidStep(_))
        ));
        assert!(matches!(
            FallbackPolicy::new(0.6, 0.9, 0.06, 1.5),
            Err(PolicyError::OutOfRange { name: "threshold", .. })
        ));
    }

    #[test]
    fn round2_behaves() {
        assert_eq!(round2(0.9 - 3.0 * 0.06), 0.72);
        assert_eq!(round2(0.8449), 0.84);
        assert_eq!(round2(0.8451), 0.85);
        assert_eq!(round2(0.62), 0.62);
    }
}
