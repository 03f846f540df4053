//! Role-tagged chat messages and conversation helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::content::Content;
use crate::role::Role;

/// One message in a conversation.
///
/// A conversation is an ordered `Vec<Message>` / `&[Message]`; the pipeline
/// treats it as append-only for the duration of a single completion call
/// and never mutates the caller's backing storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the message.
    pub sender: Role,

    /// The payload.
    pub content: Content,

    /// Creation time, stamped at construction.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message with an explicit role.
    pub fn new(sender: Role, content: impl Into<Content>) -> Self {
        Self {
            sender,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a user text message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into())
    }

    /// Create an assistant text message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text.into())
    }

    /// Create a system text message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text.into())
    }

    /// The text payload, if the content is the `Text` variant.
    pub fn text(&self) -> Option<&str> {
        self.content.as_text()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.content)
    }
}

/// The system prompt of a conversation: the first system-role message with
/// text content. At most one system message is treated as the prompt; any
/// later ones are ignored.
pub fn system_prompt(msgs: &[Message]) -> Option<&str> {
    msgs.iter()
        .find(|m| m.sender == Role::System)
        .and_then(|m| m.text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_roles() {
        assert_eq!(Message::user("q").sender, Role::User);
        assert_eq!(Message::assistant("a").sender, Role::Assistant);
        assert_eq!(Message::system("s").sender, Role::System);
    }

    #[test]
    fn test_text_accessor() {
        let msg = Message::user("hello");
        assert_eq!(msg.text(), Some("hello"));
    }

    #[test]
    fn test_system_prompt_first_wins() {
        let msgs = vec![
            Message::user("q"),
            Message::system("first"),
            Message::system("second"),
        ];
        assert_eq!(system_prompt(&msgs), Some("first"));
    }

    #[test]
    fn test_system_prompt_absent() {
        let msgs = vec![Message::user("q"), Message::assistant("a")];
        assert_eq!(system_prompt(&msgs), None);
    }

    #[test]
    fn test_display() {
        let msg = Message::user("hello");
        assert_eq!(msg.to_string(), "user: hello");
    }
}
