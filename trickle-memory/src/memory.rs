//! Conversation history.

use trickle_types::Message;

/// Storage for the running history of a conversation.
pub trait ConversationMemory {
    /// The history, oldest first.
    fn messages(&self) -> &[Message];

    /// Record one exchange.
    fn save_context(&mut self, input: &str, output: &str);

    /// Forget everything.
    fn clear(&mut self);
}

/// Keeps every exchange in a `Vec`, optionally capped.
///
/// With a cap, the oldest user/assistant pairs are dropped first.
#[derive(Debug, Clone, Default)]
pub struct ConversationBufferMemory {
    messages: Vec<Message>,
    max_messages: Option<usize>,
}

impl ConversationBufferMemory {
    /// Unbounded memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory holding at most `max_messages` messages.
    #[must_use]
    pub fn with_window(max_messages: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_messages: Some(max_messages),
        }
    }

    /// Number of stored messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn enforce_window(&mut self) {
        let Some(max) = self.max_messages else {
            return;
        };
        while self.messages.len() > max {
            let drop = self.messages.len().min(2);
            self.messages.drain(..drop);
        }
    }
}

impl ConversationMemory for ConversationBufferMemory {
    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn save_context(&mut self, input: &str, output: &str) {
        self.messages.push(Message::user(input));
        self.messages.push(Message::assistant(output));
        self.enforce_window();
    }

    fn clear(&mut self) {
        self.messages.clear();
    }
}
