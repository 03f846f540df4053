//! # candor-llm
//!
//! Completion backends and the self-correcting validation pipeline.
//!
//! Every backend implements [`ChatCompleter`]; the [`Validator`] wraps a
//! primary backend and a judge backend behind the same trait, so callers
//! cannot tell a validated backend from a raw one.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use candor_chat::Message;
//! use candor_llm::{providers::Anthropic, ChatCompleter, Validator};
//!
//! let model = Arc::new(Anthropic::new(api_key.clone()));
//! let judge = Arc::new(Anthropic::new(api_key).with_model("claude-haiku-4-5"));
//! let backend = Validator::new(model, judge).with_max_retry(3);
//!
//! let reply = backend
//!     .complete(&[
//!         Message::system("Answer in one sentence."),
//!         Message::user("What is ownership?"),
//!     ])
//!     .await?;
//! ```
//!
//! ## Failure semantics
//!
//! The only error surfaced from a validated completion is a primary-backend
//! failure on the very first generation (plus cancellation and contract
//! violations). Judge failures degrade to a rejection verdict and force a
//! correction round; an exhausted retry budget returns the best candidate
//! with a visible warning.

pub mod completer;
pub mod config;
pub mod observe;
pub mod providers;
pub mod validator;

// Re-export main types at crate root
pub use completer::{ChatCompleter, CompletionError};
pub use config::{LlmConfig, ProviderConfig, ProviderKind, ValidationConfig};
pub use observe::{TracingObserver, ValidationObserver, ValidationStatus};
pub use validator::{CorrectionFailurePolicy, Validator, Verdict};
