//! Chat prompt templates.

use trickle_types::Message;

/// Placeholder replaced by the user's input in the human template.
pub const INPUT_VARIABLE: &str = "{input}";

/// Errors from building a prompt template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// The human template never mentions the input variable.
    #[error("human template {template:?} does not contain {{input}}")]
    MissingInput {
        /// The offending template.
        template: String,
    },
}

/// A three-part chat prompt: system message, history, human message.
///
/// Formatting yields `[system?, ...history, human]`. Only `{input}` is
/// substituted; any other brace text is left as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPromptTemplate {
    system: Option<String>,
    human: String,
}

impl ChatPromptTemplate {
    /// A template with a system prompt.
    pub fn new(system: impl Into<String>, human: impl Into<String>) -> Result<Self, TemplateError> {
        let mut template = Self::without_system(human)?;
        template.system = Some(system.into());
        Ok(template)
    }

    /// A template with no system prompt.
    pub fn without_system(human: impl Into<String>) -> Result<Self, TemplateError> {
        let human = human.into();
        if !human.contains(INPUT_VARIABLE) {
            return Err(TemplateError::MissingInput { template: human });
        }
        Ok(Self { system: None, human })
    }

    /// A template whose human message is the raw input.
    #[must_use]
    pub fn with_system(system: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            human: INPUT_VARIABLE.to_string(),
        }
    }

    /// The system prompt, if any.
    #[must_use]
    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// Render the prompt around `history` for `input`.
    #[must_use]
    pub fn format(&self, history: &[Message], input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(system) = &self.system {
            messages.push(Message::system(system.clone()));
        }
        messages.extend_from_slice(history);
        messages.push(Message::user(self.human.replace(INPUT_VARIABLE, input)));
        messages
    }
}

impl Default for ChatPromptTemplate {
    fn default() -> Self {
        Self {
            system: None,
            human: INPUT_VARIABLE.to_string(),
        }
    }
}
