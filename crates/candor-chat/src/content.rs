//! Message content union.
//!
//! Content is a closed tagged union. The validation pipeline only operates
//! on the `Text` variant; interactive variants (`Command`, `Select`) exist
//! for chat front-ends and are rejected with a typed error wherever text is
//! required, never silently ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A slash-style command a front-end can offer the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Lowercase ASCII name, digits and underscores.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Arguments passed back to the handler when chosen.
    pub args: String,
}

/// One entry of a selection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectItem {
    /// Visible caption.
    pub caption: String,

    /// Opaque payload passed back to the handler when chosen.
    pub data: String,
}

/// A selection list shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Select {
    /// Header shown above the items.
    pub header: String,

    /// The selectable items.
    pub items: Vec<SelectItem>,
}

/// The payload of a [`Message`](crate::Message).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Content {
    /// Plain text. The only variant the completion backends accept.
    Text(String),

    /// A single command offered to the user.
    Command(Command),

    /// A list of commands offered to the user.
    CommandList(Vec<Command>),

    /// A selection list shown to the user.
    Select(Select),
}

impl Content {
    /// The text payload, if this is the `Text` variant.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Stable variant name, used when reporting contract violations.
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Text(_) => "text",
            Content::Command(_) => "command",
            Content::CommandList(_) => "command_list",
            Content::Select(_) => "select",
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(text) => f.write_str(text),
            Content::Command(cmd) => write!(f, "/{}", cmd.name),
            Content::CommandList(cmds) => {
                for (i, cmd) in cmds.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "/{}", cmd.name)?;
                }
                Ok(())
            }
            Content::Select(select) => f.write_str(&select.header),
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_text_only_for_text() {
        assert_eq!(Content::Text("hi".into()).as_text(), Some("hi"));

        let select = Content::Select(Select {
            header: "Pick one".into(),
            items: vec![],
        });
        assert_eq!(select.as_text(), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Content::Text(String::new()).kind(), "text");
        assert_eq!(
            Content::CommandList(vec![]).kind(),
            "command_list"
        );
    }

    #[test]
    fn test_serde_tagging() {
        let content = Content::Text("hello".into());
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["value"], "hello");

        let back: Content = serde_json::from_value(json).unwrap();
        assert_eq!(back, content);
    }
}
