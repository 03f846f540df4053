//! Message sender roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a message.
///
/// `Undefined` exists only as a construction-time placeholder; a message
/// leaving the pipeline always carries one of the three concrete roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Undefined,
    User,
    Assistant,
    System,
}

impl Role {
    /// Stable lowercase name, used in transcripts and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Undefined => "undefined",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
