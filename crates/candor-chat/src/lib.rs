//! # candor-chat
//!
//! The chat data model shared by every candor backend: role-tagged
//! messages with a closed content union.
//!
//! ## Key Guarantees
//!
//! 1. **Closed content union**: backends pattern-match `Content` exhaustively;
//!    a new variant is a compile error at every call site, never a silent skip
//! 2. **No I/O**: this crate is pure data, safe to use from any runtime
//! 3. **Stable wire shape**: serde derives with snake_case tags throughout
//!
//! ## Example
//!
//! ```rust
//! use candor_chat::{Content, Message, Role};
//!
//! let msgs = vec![
//!     Message::system("You are a concise assistant."),
//!     Message::user("What is a monad?"),
//! ];
//!
//! assert_eq!(msgs[0].sender, Role::System);
//! assert!(matches!(msgs[1].content, Content::Text(_)));
//! ```

pub mod content;
pub mod message;
pub mod role;

// Re-export main types at crate root
pub use content::{Command, Content, Select, SelectItem};
pub use message::{system_prompt, Message};
pub use role::Role;
