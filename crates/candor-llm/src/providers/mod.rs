//! LLM provider clients.
//!
//! Each provider implements [`ChatCompleter`](crate::ChatCompleter) over its
//! vendor HTTP API. Providers are feature-gated so downstream crates only
//! pull in `reqwest` for the backends they actually use; the closure-backed
//! [`MockCompleter`] is always available.
//!
//! ## Security
//!
//! API keys are held as [`secrecy::SecretString`]: they never appear in
//! `Debug` output and are exposed only at the point of request construction.

mod mock;

#[cfg(feature = "anthropic")]
mod anthropic;

#[cfg(feature = "openai")]
mod openai;

pub use mock::MockCompleter;

#[cfg(any(feature = "anthropic", feature = "openai"))]
use crate::completer::CompletionError;
#[cfg(any(feature = "anthropic", feature = "openai"))]
use candor_chat::{Message, Role};

/// Extract the text payload, rejecting interactive content variants.
#[cfg(any(feature = "anthropic", feature = "openai"))]
pub(crate) fn message_text(msg: &Message) -> Result<&str, CompletionError> {
    msg.content.as_text().ok_or(CompletionError::UnsupportedContent {
        kind: msg.content.kind(),
    })
}

/// Map a role to its wire name, rejecting `Undefined`.
#[cfg(any(feature = "anthropic", feature = "openai"))]
pub(crate) fn wire_role(role: Role) -> Result<&'static str, CompletionError> {
    match role {
        Role::User => Ok("user"),
        Role::Assistant => Ok("assistant"),
        Role::System => Ok("system"),
        Role::Undefined => Err(CompletionError::UnsupportedRole {
            role: role.to_string(),
        }),
    }
}

#[cfg(feature = "anthropic")]
pub use anthropic::Anthropic;

#[cfg(feature = "openai")]
pub use openai::OpenAi;
