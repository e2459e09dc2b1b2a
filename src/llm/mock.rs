//! Scripted gateway used by unit tests across the crate.

use crate::error::{AgentError, Result};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::LlmMessage;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<LlmMessage>,
}

/// Replays canned replies in order; `Err` entries become gateway errors.
pub struct MockGateway {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    pub fn new(responses: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(responses: &[&str]) -> Self {
        Self::new(responses.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmGateway for MockGateway {
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        config: &CompletionConfig,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            temperature: config.temperature,
            messages: messages.to_vec(),
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(AgentError::GatewayError(msg)),
            None => Err(AgentError::GatewayError("no scripted response left".to_string())),
        }
    }
}
