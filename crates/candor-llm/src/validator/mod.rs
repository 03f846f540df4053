//! The validation orchestrator.
//!
//! [`Validator`] wraps a primary completion backend and a judge backend.
//! Each call runs an explicit state machine:
//!
//! ```text
//! Generating -> Validating -> { Accepted, Correcting, Exhausted }
//!                  ^                |
//!                  +-- Correcting --+   (loops back through Generating)
//! ```
//!
//! The retry budget is reserved for validation failures: a primary backend
//! error on the very first generation propagates to the caller, while the
//! same error on a corrective generation is transient (logged, short
//! backoff, loop continues). Judge failures of any kind degrade to a
//! synthetic rejection verdict. Exhausting the budget is a degraded
//! success - refusing to answer is worse than answering with a caveat.

mod directive;
mod transcript;
mod verdict;

pub use directive::correction_directive;
pub use transcript::{render_judge_transcript, JUDGE_SYSTEM_PROMPT};
pub use verdict::Verdict;

use async_trait::async_trait;
use candor_chat::{Content, Message, Role};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::completer::{ChatCompleter, CompletionError};
use crate::observe::{TracingObserver, ValidationObserver, ValidationStatus};
use verdict::SYNTHETIC_REJECTION_REASON;

const DEFAULT_MAX_RETRY: u32 = 5;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Whether a corrective generation that fails at the transport level
/// consumes an attempt from the retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrectionFailurePolicy {
    /// The failed attempt counts toward `max_retry` (default).
    #[default]
    ConsumesAttempt,

    /// Transport failures are free. Termination is still guaranteed:
    /// once `max_retry` transport failures accumulate, the call returns
    /// the last candidate with an exhaustion warning.
    Free,
}

/// One step of the per-call state machine.
#[derive(Debug)]
enum Phase {
    /// Ask the primary backend for a (corrective) candidate.
    Generating,

    /// Submit the current candidate to the judge.
    Validating,

    /// The verdict rejected the candidate; synthesize a correction directive.
    Correcting(Verdict),

    /// Terminal: the candidate was approved.
    Accepted(Verdict),

    /// Terminal: the budget is exhausted; return the candidate with a caveat.
    Exhausted(Verdict),
}

/// Decide the next phase from a verdict.
///
/// Pure so the decision logic is testable apart from any backend.
fn decide(verdict: Verdict, last_attempt: bool) -> Phase {
    if verdict.approved() {
        Phase::Accepted(verdict)
    } else if last_attempt {
        Phase::Exhausted(verdict)
    } else {
        Phase::Correcting(verdict)
    }
}

/// Annotations are only added to free-form prose, never to structured
/// answers a downstream parser might consume.
fn is_prose(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_err()
}

fn append_note(msg: &mut Message, note: &str) {
    if let Content::Text(text) = &mut msg.content {
        text.push_str(note);
    }
}

/// Supervises a primary backend by judging every candidate answer and
/// requesting corrections within a bounded number of attempts.
///
/// `Validator` is itself a [`ChatCompleter`], so callers cannot tell a
/// validated backend from a raw one. All per-call state lives on the call
/// stack; concurrent callers share only immutable configuration.
pub struct Validator {
    model: Arc<dyn ChatCompleter>,
    judge: Arc<dyn ChatCompleter>,
    max_retry: u32,
    debug: bool,
    failure_policy: CorrectionFailurePolicy,
    backoff: Duration,
    observer: Arc<dyn ValidationObserver>,
}

impl Validator {
    /// Wrap a primary backend with a judge.
    ///
    /// The two handles may point to the same concrete backend.
    pub fn new(model: Arc<dyn ChatCompleter>, judge: Arc<dyn ChatCompleter>) -> Self {
        Self {
            model,
            judge,
            max_retry: DEFAULT_MAX_RETRY,
            debug: false,
            failure_policy: CorrectionFailurePolicy::default(),
            backoff: DEFAULT_BACKOFF,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Set the retry budget. Values <= 0 normalize to the default of 5
    /// here, at construction time, never per-call.
    pub fn with_max_retry(mut self, max_retry: i32) -> Self {
        self.max_retry = if max_retry <= 0 {
            DEFAULT_MAX_RETRY
        } else {
            max_retry as u32
        };
        self
    }

    /// Toggle visible confidence annotations on approved prose answers.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the budget policy for failed corrective generations.
    pub fn with_failure_policy(mut self, policy: CorrectionFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the fixed backoff applied after a failed corrective generation.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the observability sink.
    pub fn with_observer(mut self, observer: Arc<dyn ValidationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Complete with a caller-supplied cancellation signal.
    ///
    /// The token is checked between network calls; once it fires the loop
    /// aborts with [`CompletionError::Cancelled`] instead of retrying
    /// further. In-flight backend calls are bounded by the backends' own
    /// timeout policies.
    pub async fn complete_with_cancellation(
        &self,
        msgs: &[Message],
        cancel: &CancellationToken,
    ) -> Result<Message, CompletionError> {
        let start = Instant::now();

        // Private growable copy; the caller's storage is never touched.
        let mut working: Vec<Message> = msgs.to_vec();

        let mut candidate = match self.model.complete(&working).await {
            Ok(msg) => msg,
            Err(err) => {
                tracing::warn!(error = %err, "initial generation failed");
                self.observer.record_duration(
                    self.model.name(),
                    ValidationStatus::InitialError,
                    start.elapsed(),
                );
                return Err(err);
            }
        };
        working.push(Message::new(Role::Assistant, candidate.content.clone()));

        let mut attempt: u32 = 0;
        let mut retry_count: u32 = 0;
        let mut transport_failures: u32 = 0;
        let mut phase = Phase::Validating;

        loop {
            phase = match phase {
                Phase::Validating => {
                    if cancel.is_cancelled() {
                        return Err(CompletionError::Cancelled);
                    }

                    let text = match candidate.text() {
                        Some(text) => text.to_string(),
                        None => {
                            return Err(CompletionError::UnsupportedContent {
                                kind: candidate.content.kind(),
                            })
                        }
                    };

                    let verdict = self.judge_candidate(msgs, &text).await;
                    tracing::debug!(
                        send = verdict.can_send_to_user,
                        follows = verdict.follows_prompt,
                        score = verdict.reliability_score,
                        "judge verdict"
                    );
                    self.observer
                        .record_score(self.model.name(), verdict.reliability_score);

                    decide(verdict, attempt + 1 >= self.max_retry)
                }

                Phase::Accepted(verdict) => {
                    if self.debug {
                        if let Some(text) = candidate.text() {
                            if is_prose(text) {
                                let note = format!(
                                    "\n\n[Response validated. Confidence: {:.0}%]",
                                    verdict.reliability_score * 100.0
                                );
                                append_note(&mut candidate, &note);
                            }
                        }
                    }

                    self.observer.record_retries(self.model.name(), retry_count);
                    self.observer.record_duration(
                        self.model.name(),
                        ValidationStatus::Success,
                        start.elapsed(),
                    );
                    return Ok(candidate);
                }

                Phase::Exhausted(verdict) => {
                    if let Some(text) = candidate.text() {
                        if is_prose(text) {
                            let note = format!(
                                "\n\n[WARNING: this answer may be inaccurate. \
                                 Reliability: {:.0}%. Reason: {}]",
                                verdict.reliability_score * 100.0,
                                verdict.reason.as_deref().unwrap_or("unspecified"),
                            );
                            append_note(&mut candidate, &note);
                        }
                    }

                    self.observer.record_retries(self.model.name(), retry_count);
                    self.observer.record_duration(
                        self.model.name(),
                        ValidationStatus::MaxRetries,
                        start.elapsed(),
                    );
                    return Ok(candidate);
                }

                Phase::Correcting(verdict) => {
                    tracing::info!(
                        reason = verdict.reason.as_deref().unwrap_or("unspecified"),
                        "requesting correction"
                    );
                    working.push(correction_directive(&verdict));
                    retry_count += 1;
                    Phase::Generating
                }

                Phase::Generating => {
                    if cancel.is_cancelled() {
                        return Err(CompletionError::Cancelled);
                    }

                    match self.model.complete(&working).await {
                        Ok(msg) => {
                            working.push(Message::new(Role::Assistant, msg.content.clone()));
                            candidate = msg;
                            attempt += 1;
                            Phase::Validating
                        }
                        Err(err) => {
                            // Transient: the budget is reserved for validation
                            // failures, not transport failures mid-loop.
                            tracing::warn!(error = %err, "corrective generation failed");
                            tokio::time::sleep(self.backoff).await;
                            transport_failures += 1;

                            match self.failure_policy {
                                CorrectionFailurePolicy::ConsumesAttempt => {
                                    attempt += 1;
                                    Phase::Validating
                                }
                                CorrectionFailurePolicy::Free => {
                                    if transport_failures >= self.max_retry {
                                        Phase::Exhausted(Verdict::rejection(
                                            "correction attempts failed",
                                        ))
                                    } else {
                                        Phase::Validating
                                    }
                                }
                            }
                        }
                    }
                }
            };
        }
    }

    /// Submit one candidate to the judge and decode its verdict.
    ///
    /// Infallible by design: any judge transport error or undecodable
    /// output degrades to the synthetic rejection, forcing a correction
    /// attempt instead of a crash.
    async fn judge_candidate(&self, original: &[Message], candidate: &str) -> Verdict {
        let transcript = render_judge_transcript(original, candidate);
        let judge_msgs = [
            Message::system(JUDGE_SYSTEM_PROMPT),
            Message::user(transcript),
        ];

        match self.judge.complete(&judge_msgs).await {
            Ok(reply) => match reply.text() {
                Some(text) => Verdict::parse(text),
                None => {
                    tracing::warn!(kind = reply.content.kind(), "judge returned non-text content");
                    Verdict::rejection(SYNTHETIC_REJECTION_REASON)
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "judge request failed");
                Verdict::rejection(SYNTHETIC_REJECTION_REASON)
            }
        }
    }
}

#[async_trait]
impl ChatCompleter for Validator {
    async fn complete(&self, msgs: &[Message]) -> Result<Message, CompletionError> {
        self.complete_with_cancellation(msgs, &CancellationToken::new())
            .await
    }

    fn name(&self) -> &str {
        self.model.name()
    }
}
