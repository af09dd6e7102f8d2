//! The two-part walkthrough run by the binary.
//!
//! 1. A one-shot request: persona system message plus one question.
//! 2. A remembered conversation: a friendly-assistant template over buffer
//!    memory, asked several questions in a row.
//!
//! Every generation gets its own [`ThrottledTokenSink`].

use trickle_memory::{ChatPromptTemplate, ConversationBufferMemory, ConversationChain};
use trickle_sink::{OutputSink, SinkConfig, ThrottledTokenSink};
use trickle_types::{CompletionRequest, Message, Provider, ProviderError, stream_into};

/// Persona for the one-shot request.
pub const DEFAULT_SYSTEM: &str = "You are WANCO, a care worker at a nursing home. \
The person you are talking to is an elderly resident of the home. Be gentle and kind.";

/// Question for the one-shot request.
pub const DEFAULT_PROMPT: &str = "Hello, my lower back hurts. What should I do?";

/// System template for the conversation.
pub const DEFAULT_CONVERSATION_SYSTEM: &str = "You are an AI that talks with humans in a friendly way.\n\
The AI is talkative and gives many specific details from its context.\n\
If the AI does not know the answer to a question, it honestly says it does not know.";

/// Default conversation turns. The second checks that the first was remembered.
pub const DEFAULT_TURNS: [&str; 2] = [
    "I'm Taro Suzuki, and my lower back hurts. What should I do?",
    "Do you remember my name? What condition am I in?",
];

/// What the walkthrough asks.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Sink settings shared by every generation.
    pub sink: SinkConfig,
    /// Sampling temperature.
    pub temperature: f32,
    /// Persona for the one-shot request.
    pub system: String,
    /// Question for the one-shot request.
    pub prompt: String,
    /// System template for the conversation.
    pub conversation_system: String,
    /// Conversation inputs, asked in order.
    pub turns: Vec<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sink: SinkConfig::default(),
            temperature: 0.0,
            system: DEFAULT_SYSTEM.into(),
            prompt: DEFAULT_PROMPT.into(),
            conversation_system: DEFAULT_CONVERSATION_SYSTEM.into(),
            turns: DEFAULT_TURNS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// Run the walkthrough against `provider`.
///
/// `make_output` is called once per generation to build that generation's
/// output sink. Returns the full reply of every generation, one-shot first.
pub async fn run<P, O, F>(
    provider: P,
    config: &DemoConfig,
    mut make_output: F,
) -> Result<Vec<String>, ProviderError>
where
    P: Provider,
    O: OutputSink,
    F: FnMut() -> O,
{
    let mut replies = Vec::with_capacity(config.turns.len() + 1);

    tracing::info!("one-shot request");
    let request = CompletionRequest {
        messages: vec![
            Message::system(config.system.clone()),
            Message::user(config.prompt.clone()),
        ],
        temperature: Some(config.temperature),
        ..Default::default()
    };
    let mut sink = ThrottledTokenSink::with_config(config.sink, make_output());
    let response = stream_into(&provider, request, &mut sink).await?;
    tracing::debug!(
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        "one-shot done"
    );
    replies.push(response.message.content);

    let mut chain = ConversationChain::new(
        provider,
        ChatPromptTemplate::with_system(config.conversation_system.clone()),
        ConversationBufferMemory::new(),
    )
    .temperature(config.temperature);

    for (i, turn) in config.turns.iter().enumerate() {
        tracing::info!(turn = i + 1, "conversation turn");
        let mut sink = ThrottledTokenSink::with_config(config.sink, make_output());
        replies.push(chain.predict(turn, &mut sink).await?);
    }

    Ok(replies)
}
