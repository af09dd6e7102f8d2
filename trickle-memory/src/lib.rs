#![deny(missing_docs)]
//! Stateful conversations on top of a streaming [`Provider`](trickle_types::Provider).
//!
//! - [`ChatPromptTemplate`]: system prompt, history slot, and a human
//!   template with an `{input}` variable.
//! - [`ConversationBufferMemory`]: ordered in-memory history, optionally
//!   windowed. Nothing is persisted.
//! - [`ConversationChain`]: formats the prompt, streams the reply through
//!   caller-supplied callbacks, and records the exchange on success.

pub mod chain;
pub mod memory;
pub mod template;

pub use chain::ConversationChain;
pub use memory::{ConversationBufferMemory, ConversationMemory};
pub use template::{ChatPromptTemplate, INPUT_VARIABLE, TemplateError};
