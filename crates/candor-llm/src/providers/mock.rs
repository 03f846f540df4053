//! Closure-backed completion backend for tests and wiring checks.

use async_trait::async_trait;
use candor_chat::Message;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::completer::{ChatCompleter, CompletionError};

type MockFn = dyn Fn(&[Message]) -> Result<Message, CompletionError> + Send + Sync;

/// A [`ChatCompleter`] backed by a caller-supplied closure.
///
/// Counts invocations, which lets tests assert call budgets without any
/// shared test fixtures.
pub struct MockCompleter {
    reply: Box<MockFn>,
    calls: AtomicU32,
}

impl MockCompleter {
    /// Create a mock from a closure receiving the full conversation.
    pub fn new<F>(reply: F) -> Self
    where
        F: Fn(&[Message]) -> Result<Message, CompletionError> + Send + Sync + 'static,
    {
        Self {
            reply: Box::new(reply),
            calls: AtomicU32::new(0),
        }
    }

    /// Convenience mock that always answers with the same text.
    pub fn replying(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(Message::assistant(text.clone())))
    }

    /// How many times `complete` has been called.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompleter for MockCompleter {
    async fn complete(&self, msgs: &[Message]) -> Result<Message, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)(msgs)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_counts_calls() {
        let mock = MockCompleter::replying("hi");
        assert_eq!(mock.calls(), 0);

        let reply = mock.complete(&[Message::user("q")]).await.unwrap();
        assert_eq!(reply.text(), Some("hi"));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_propagates_errors() {
        let mock = MockCompleter::new(|_| Err(CompletionError::Http("down".into())));
        let err = mock.complete(&[Message::user("q")]).await.unwrap_err();
        assert!(matches!(err, CompletionError::Http(_)));
    }
}
