#![deny(missing_docs)]
//! Core types for trickle.
//!
//! - [`Message`], [`CompletionRequest`], [`CompletionResponse`]: the chat
//!   lingua franca. Providers convert to and from these.
//! - [`Provider`]: the LLM backend seam.
//! - [`StreamEvent`] / [`StreamHandle`]: what a streaming provider yields.
//! - [`StreamCallbacks`] / [`drive_stream`]: the three-method handler a
//!   stream is pushed through, one event at a time.

pub mod error;
pub mod stream;
pub mod traits;
pub mod types;

pub use error::*;
pub use stream::*;
pub use traits::*;
pub use types::*;
