//! The completion backend contract.
//!
//! Every backend - provider clients, the mock, and the [`Validator`] itself -
//! implements [`ChatCompleter`], so callers cannot tell a validated backend
//! from a raw one.
//!
//! [`Validator`]: crate::Validator

use async_trait::async_trait;
use candor_chat::Message;
use std::time::Duration;
use thiserror::Error;

/// Errors from completion backends.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// A message carried a role the backend cannot forward.
    #[error("unsupported role: {role}")]
    UnsupportedRole { role: String },

    /// A message carried a content variant where text was required.
    #[error("unsupported content type: {kind}")]
    UnsupportedContent { kind: &'static str },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("backend not configured: {0}")]
    NotConfigured(String),

    /// The caller's cancellation signal fired between network calls.
    #[error("completion cancelled")]
    Cancelled,
}

impl CompletionError {
    /// Whether a retry at the transport level could plausibly succeed.
    ///
    /// Used by providers for their own network retry policy. Contract
    /// violations and API rejections are never retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CompletionError::Http(_)
                | CompletionError::RateLimited { .. }
                | CompletionError::Timeout(_)
        )
    }
}

/// A backend that turns an ordered conversation into one new assistant message.
///
/// # Contract
/// - Every input message content must be `Content::Text`, otherwise the
///   backend fails with [`CompletionError::UnsupportedContent`]
/// - Every input sender must be user, assistant, or system, otherwise the
///   backend fails with [`CompletionError::UnsupportedRole`]
/// - Backends own their network retry and timeout policy
/// - On success the returned message has sender = `Role::Assistant` and
///   `Content::Text` content
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Execute a chat completion over the given conversation.
    ///
    /// The conversation is borrowed and never mutated; backends that need
    /// to reshape it (system prompt extraction, role mapping) work on their
    /// own copy.
    async fn complete(&self, msgs: &[Message]) -> Result<Message, CompletionError>;

    /// Backend name for observability labels.
    fn name(&self) -> &str;
}
