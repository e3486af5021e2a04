//! Property tests for synthesized compatibility responses.

use polaris_core::{CompatibilityRequest, FallbackPolicy, FromJsonPayload};
use proptest::prelude::*;
use serde_json::json;

fn activities() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z][A-Za-z &-]{0,30}", 1..40)
}

fn request(activities: &[String]) -> CompatibilityRequest {
    CompatibilityRequest::from_json(&json!({
        "trade_name": "Desert Rose Trading",
        "business_activities": activities,
        "language": "arabic"
    }))
    .expect("generated request is valid")
}

proptest! {
    /// One result per activity, in order, with counts that add up.
    #[test]
    fn results_cover_every_activity(list in activities()) {
        let resp = FallbackPolicy::default().synthesize(&request(&list));
        prop_assert_eq!(resp.results.len(), list.len());
        prop_assert_eq!(resp.total_activities, list.len());
        prop_assert_eq!(
            resp.consistent_activities + resp.inconsistent_activities,
            resp.total_activities
        );
        for (result, activity) in resp.results.iter().zip(&list) {
            prop_assert_eq!(&result.activity_description, activity);
        }
    }

    /// Scores never rise along the list and stay within [0.62, 0.90].
    #[test]
    fn scores_are_bounded_and_non_increasing(list in activities()) {
        let resp = FallbackPolicy::default().synthesize(&request(&list));
        let scores: Vec<f64> = resp.results.iter().map(|r| r.compatibility_score).collect();
        for score in &scores {
            prop_assert!((0.62..=0.90).contains(score), "score {} out of bounds", score);
        }
        for pair in scores.windows(2) {
            prop_assert!(pair[1] <= pair[0]);
        }
    }

    /// Consistency is exactly `score >= threshold`.
    #[test]
    fn consistency_tracks_threshold(list in activities()) {
        let policy = FallbackPolicy::default();
        let resp = policy.synthesize(&request(&list));
        for result in &resp.results {
            prop_assert_eq!(result.is_consistent, result.compatibility_score >= policy.threshold());
            prop_assert_eq!(result.threshold, policy.threshold());
        }
        prop_assert_eq!(resp.threshold_used, policy.threshold());
    }

    /// A valid custom policy keeps scores between its floor and base.
    #[test]
    fn custom_policy_respects_its_bounds(
        min in 0.0f64..0.5,
        spread in 0.0f64..0.5,
        step in 0.0f64..0.2,
        threshold in 0.0f64..=1.0,
        list in activities(),
    ) {
        let base = min + spread;
        let policy = FallbackPolicy::new(min, base, step, threshold).expect("valid policy");
        let resp = policy.synthesize(&request(&list));
        for result in &resp.results {
            prop_assert!(result.compatibility_score >= polaris_core::fallback::round2(min));
            prop_assert!(result.compatibility_score <= polaris_core::fallback::round2(base));
        }
    }
}
