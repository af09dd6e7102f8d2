#![deny(missing_docs)]
//! # trickle
//!
//! One import surface for the trickle crates, plus the pieces behind the
//! `trickle` demo binary (behind the `cli` feature).

pub use trickle_sink;
pub use trickle_types;

#[cfg(feature = "memory")]
pub use trickle_memory;
#[cfg(feature = "provider-openai")]
pub use trickle_provider_openai;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod demo;
#[cfg(feature = "cli")]
pub mod logging;

/// Happy-path imports.
pub mod prelude {
    pub use trickle_sink::{
        Clock, ConsoleSink, MemorySink, OutputSink, SinkConfig, SystemClock, ThrottledTokenSink,
        TracingSink,
    };
    pub use trickle_types::{
        CompletionRequest, CompletionResponse, Message, Provider, ProviderError, Role,
        StreamCallbacks, drive_stream,
    };

    #[cfg(feature = "memory")]
    pub use trickle_memory::{
        ChatPromptTemplate, ConversationBufferMemory, ConversationChain, ConversationMemory,
    };

    #[cfg(feature = "provider-openai")]
    pub use trickle_provider_openai::OpenAi;
}
