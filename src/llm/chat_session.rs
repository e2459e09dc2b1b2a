//! Free-form multi-turn chat.
//!
//! Every call to [`ChatSession::send`] ships the whole transcript to the model, so the
//! model answers with the full conversation as context.

use crate::error::Result;
use crate::llm::broker::LlmBroker;
use crate::llm::models::{LlmMessage, MessageRole};
use tracing::debug;

/// A chat session that owns its conversation transcript.
///
/// # Examples
///
/// ```ignore
/// use agentpro::llm::{ChatSession, LlmBroker};
/// use agentpro::llm::gateways::OpenAIGateway;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let gateway = Arc::new(OpenAIGateway::new()?);
///     let broker = LlmBroker::new("gpt-4o", gateway);
///     let mut session = ChatSession::new(broker);
///
///     let response = session.send("¿Qué es Rust?").await?;
///     println!("{}", response);
///
///     Ok(())
/// }
/// ```
pub struct ChatSession {
    broker: LlmBroker,
    system_prompt: Option<String>,
    messages: Vec<LlmMessage>,
}

impl ChatSession {
    /// Create a new chat session without a system prompt.
    pub fn new(broker: LlmBroker) -> Self {
        Self {
            broker,
            system_prompt: None,
            messages: Vec::new(),
        }
    }

    /// Prepend `prompt` as a system message on every request.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Send a message to the LLM and get a response.
    ///
    /// The user message is recorded before the call. If the call fails the message stays
    /// in the transcript and the error is returned; no assistant turn is added.
    pub async fn send(&mut self, query: &str) -> Result<String> {
        self.messages.push(LlmMessage::user(query));

        let mut request = Vec::with_capacity(self.messages.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            request.push(LlmMessage::system(prompt.as_str()));
        }
        request.extend(self.messages.iter().cloned());

        debug!(turns = self.messages.len(), "Sending chat transcript");
        let response = self.broker.generate(&request).await?;

        self.messages.push(LlmMessage::assistant(&response));

        Ok(response)
    }

    /// Drop every recorded turn. The system prompt is kept.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Get the current conversation history
    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn broker(&self) -> &LlmBroker {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut LlmBroker {
        &mut self.broker
    }

    /// Number of user turns so far.
    pub fn user_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.role == MessageRole::User).count()
    }
}
