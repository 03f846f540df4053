//! Observability sink for the validation pipeline.
//!
//! The [`Validator`](crate::Validator) reports per-call score, retry count,
//! and total duration through a [`ValidationObserver`]. Implementations must
//! tolerate concurrent calls from independent completions; the trait takes
//! `&self` everywhere, so interior mutability (atomics) is on the
//! implementor.

use std::time::Duration;

/// Terminal status of one validated completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStatus {
    /// A candidate was approved within the budget.
    Success,

    /// The primary backend failed on the very first generation.
    InitialError,

    /// The retry budget was exhausted; a warning-annotated answer was returned.
    MaxRetries,
}

impl ValidationStatus {
    /// Stable label for metrics and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Success => "success",
            ValidationStatus::InitialError => "initial_error",
            ValidationStatus::MaxRetries => "max_retries",
        }
    }
}

/// Receives validation pipeline events.
pub trait ValidationObserver: Send + Sync {
    /// One judge verdict's reliability score for the given model.
    fn record_score(&self, model: &str, score: f64);

    /// How many correction rounds a completed call needed.
    fn record_retries(&self, model: &str, retries: u32);

    /// Total wall-clock duration of one call, tagged with terminal status.
    fn record_duration(&self, model: &str, status: ValidationStatus, elapsed: Duration);
}

/// Default observer: structured tracing events under the
/// `candor::validation` target, ready for log-based scraping.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ValidationObserver for TracingObserver {
    fn record_score(&self, model: &str, score: f64) {
        tracing::info!(target: "candor::validation", model, score, "validation score");
    }

    fn record_retries(&self, model: &str, retries: u32) {
        tracing::info!(target: "candor::validation", model, retries, "validation retries");
    }

    fn record_duration(&self, model: &str, status: ValidationStatus, elapsed: Duration) {
        tracing::info!(
            target: "candor::validation",
            model,
            status = status.as_str(),
            elapsed_ms = elapsed.as_millis() as u64,
            "validation finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(ValidationStatus::Success.as_str(), "success");
        assert_eq!(ValidationStatus::InitialError.as_str(), "initial_error");
        assert_eq!(ValidationStatus::MaxRetries.as_str(), "max_retries");
    }
}
