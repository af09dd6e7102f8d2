//! A conversation that remembers.

use trickle_types::{CompletionRequest, Provider, ProviderError, StreamCallbacks, stream_into};

use crate::memory::{ConversationBufferMemory, ConversationMemory};
use crate::template::ChatPromptTemplate;

/// Multi-turn conversation over a streaming provider.
///
/// Each [`predict`](Self::predict) call renders the prompt around the stored
/// history, streams the reply into the given callbacks, and saves the
/// exchange only if the generation succeeded.
///
/// ```no_run
/// # async fn demo() -> Result<(), trickle_types::ProviderError> {
/// use trickle_memory::{ChatPromptTemplate, ConversationBufferMemory, ConversationChain};
/// use trickle_provider_openai::OpenAi;
/// use trickle_sink::{ConsoleSink, ThrottledTokenSink};
///
/// let mut chain = ConversationChain::new(
///     OpenAi::new("EMPTY"),
///     ChatPromptTemplate::with_system("You are a friendly assistant."),
///     ConversationBufferMemory::new(),
/// );
/// let mut sink = ThrottledTokenSink::new(ConsoleSink::stdout());
/// chain.predict("Hi, I'm Taro.", &mut sink).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConversationChain<P, M = ConversationBufferMemory> {
    provider: P,
    prompt: ChatPromptTemplate,
    memory: M,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl<P: Provider, M: ConversationMemory> ConversationChain<P, M> {
    /// Build a chain. The provider's default model is used unless overridden.
    pub fn new(provider: P, prompt: ChatPromptTemplate, memory: M) -> Self {
        Self {
            provider,
            prompt,
            memory,
            model: String::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Override the model for every request.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature for every request.
    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the reply length for every request.
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask one question and stream the answer into `callbacks`.
    ///
    /// A request that fails before streaming starts still reaches
    /// `callbacks.on_error`. On any failure memory is left untouched.
    pub async fn predict<C>(&mut self, input: &str, callbacks: &mut C) -> Result<String, ProviderError>
    where
        C: StreamCallbacks + ?Sized,
    {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: self.prompt.format(self.memory.messages(), input),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stop: Vec::new(),
        };
        tracing::debug!(history = self.memory.messages().len(), "predicting");

        let response = stream_into(&self.provider, request, callbacks).await?;
        let output = response.message.content;
        self.memory.save_context(input, &output);
        Ok(output)
    }

    /// The conversation history.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Mutable access to the history (e.g. to clear it).
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// The prompt template.
    pub fn prompt(&self) -> &ChatPromptTemplate {
        &self.prompt
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}
