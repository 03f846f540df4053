//! Structured judge verdicts.

use serde::{Deserialize, Serialize};

/// Reason attached to the synthetic verdict when the judge is unreachable
/// or its output cannot be decoded.
pub(crate) const SYNTHETIC_REJECTION_REASON: &str = "validation failed";

/// The judge's structured critique of one candidate answer.
///
/// Wire shape: a single JSON object with exactly `can_send_to_user`,
/// `follows_prompt`, `reliability_score` and an optional `reason` populated
/// on rejection. No surrounding markdown is tolerated; anything that fails
/// strict JSON decoding degrades to [`Verdict::rejection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the answer may be shown to the end user.
    pub can_send_to_user: bool,

    /// Whether the answer follows the system prompt structure.
    pub follows_prompt: bool,

    /// Reliability in [0, 1]. Passed through verbatim, never clamped.
    pub reliability_score: f64,

    /// Explanation, present when either boolean is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verdict {
    /// Whether the candidate passed on both axes.
    pub fn approved(&self) -> bool {
        self.can_send_to_user && self.follows_prompt
    }

    /// The all-false, zero-score rejection used when judging itself fails.
    pub fn rejection(reason: impl Into<String>) -> Self {
        Self {
            can_send_to_user: false,
            follows_prompt: false,
            reliability_score: 0.0,
            reason: Some(reason.into()),
        }
    }

    /// Decode the judge's raw text output.
    ///
    /// A flaky judge forces a correction attempt, never a crash: decode
    /// failure yields the synthetic rejection instead of an error.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(verdict) => verdict,
            Err(err) => {
                tracing::warn!(error = %err, raw, "judge output was not valid verdict JSON");
                Self::rejection(SYNTHETIC_REJECTION_REASON)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_approval() {
        let verdict = Verdict::parse(
            r#"{"can_send_to_user": true, "follows_prompt": true, "reliability_score": 0.95}"#,
        );
        assert!(verdict.approved());
        assert_eq!(verdict.reliability_score, 0.95);
        assert_eq!(verdict.reason, None);
    }

    #[test]
    fn test_parse_rejection_with_reason() {
        let verdict = Verdict::parse(
            r#"{"can_send_to_user": false, "follows_prompt": true, "reliability_score": 0.4, "reason": "unsupported claim"}"#,
        );
        assert!(!verdict.approved());
        assert_eq!(verdict.reason.as_deref(), Some("unsupported claim"));
    }

    #[test]
    fn test_parse_prose_degrades_to_rejection() {
        let verdict = Verdict::parse("Looks good to me!");
        assert!(!verdict.approved());
        assert_eq!(verdict.reliability_score, 0.0);
        assert_eq!(verdict.reason.as_deref(), Some(SYNTHETIC_REJECTION_REASON));
    }

    #[test]
    fn test_parse_markdown_wrapped_json_degrades() {
        let verdict = Verdict::parse(
            "```json\n{\"can_send_to_user\": true, \"follows_prompt\": true, \"reliability_score\": 1.0}\n```",
        );
        assert!(!verdict.approved());
    }

    #[test]
    fn test_reason_omitted_when_absent() {
        let verdict = Verdict {
            can_send_to_user: true,
            follows_prompt: true,
            reliability_score: 1.0,
            reason: None,
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert!(json.get("reason").is_none());
    }

    proptest! {
        #[test]
        fn prop_verdict_round_trips(
            can_send in any::<bool>(),
            follows in any::<bool>(),
            score in 0.0f64..=1.0,
            reason in proptest::option::of("[a-zA-Z0-9 ]{0,40}"),
        ) {
            let verdict = Verdict {
                can_send_to_user: can_send,
                follows_prompt: follows,
                reliability_score: score,
                reason,
            };

            let encoded = serde_json::to_string(&verdict).unwrap();
            let decoded = Verdict::parse(&encoded);
            prop_assert_eq!(decoded, verdict);
        }
    }
}
