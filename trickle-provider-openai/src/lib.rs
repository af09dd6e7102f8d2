#![deny(missing_docs)]
//! OpenAI-compatible Chat Completions provider for trickle.
//!
//! Targets any server that speaks the `/v1/chat/completions` dialect: the
//! OpenAI API itself, vLLM, llama.cpp's server, LocalAI, and friends. The
//! base URL carries the `/v1` prefix, so point it at whatever the server
//! documents as its "API base".
//!
//! ```no_run
//! use trickle_provider_openai::OpenAi;
//!
//! let provider = OpenAi::new("EMPTY")
//!     .base_url("http://192.168.50.80:8080/v1")
//!     .model("gpt-3.5-turbo");
//! ```
//!
//! - [`Provider::complete`](trickle_types::Provider::complete) for one-shot requests
//! - [`Provider::complete_stream`](trickle_types::Provider::complete_stream) for SSE streaming
//! - HTTP status codes mapped to [`ProviderError`] variants

pub mod client;
pub mod error;
pub mod mapping;
pub mod streaming;

pub use client::OpenAi;

// Re-export trickle-types for convenience
pub use trickle_types::{ProviderError, StreamEvent, StreamHandle};
