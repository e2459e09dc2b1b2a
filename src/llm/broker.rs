use crate::config::{validate_model, validate_temperature};
use crate::error::Result;
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::LlmMessage;
use std::sync::Arc;
use tracing::debug;

/// Main interface for LLM interactions
///
/// Binds a model name and completion settings to a gateway so callers only deal with
/// messages.
#[derive(Clone)]
pub struct LlmBroker {
    model: String,
    config: CompletionConfig,
    gateway: Arc<dyn LlmGateway>,
}

impl LlmBroker {
    /// Create a new LLM broker
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            config: CompletionConfig::default(),
            gateway,
        }
    }

    /// Set the temperature used by later calls
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.config.temperature
    }

    /// Switch model and temperature for subsequent calls.
    ///
    /// Settings are validated before anything changes; on error the broker keeps its
    /// previous configuration.
    pub fn reconfigure(&mut self, model: &str, temperature: f32) -> Result<()> {
        validate_model(model)?;
        validate_temperature(temperature)?;

        if self.model != model || self.config.temperature != temperature {
            debug!(model, temperature, "Reconfiguring broker");
            self.model = model.to_string();
            self.config.temperature = temperature;
        }

        Ok(())
    }

    /// Generate text response from LLM
    pub async fn generate(&self, messages: &[LlmMessage]) -> Result<String> {
        self.gateway.complete(&self.model, messages, &self.config).await
    }

    /// Send a single user prompt with no surrounding conversation.
    pub async fn ask(&self, prompt: impl Into<String>) -> Result<String> {
        self.generate(&[LlmMessage::user(prompt)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::llm::mock::MockGateway;
    use crate::llm::models::MessageRole;

    #[tokio::test]
    async fn test_broker_new() {
        let gateway = Arc::new(MockGateway::new(vec![]));
        let broker = LlmBroker::new("gpt-4o", gateway);
        assert_eq!(broker.model(), "gpt-4o");
        assert_eq!(broker.temperature(), 0.7);
    }

    #[tokio::test]
    async fn test_generate_simple_response() {
        let gateway = Arc::new(MockGateway::replying(&["Hello, World!"]));
        let broker = LlmBroker::new("gpt-4o", gateway);

        let result = broker.generate(&[LlmMessage::user("Hi")]).await.unwrap();

        assert_eq!(result, "Hello, World!");
    }

    #[tokio::test]
    async fn test_ask_wraps_prompt_as_single_user_message() {
        let gateway = Arc::new(MockGateway::replying(&["Diego Milito"]));
        let broker = LlmBroker::new("gpt-4o", gateway.clone());

        broker.ask("¿Quién es el máximo ídolo de Racing Club?").await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].messages.len(), 1);
        assert_eq!(calls[0].messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_generate_propagates_gateway_error() {
        let gateway = Arc::new(MockGateway::new(vec![Err("timeout".to_string())]));
        let broker = LlmBroker::new("gpt-4o", gateway);

        let result = broker.ask("Hi").await;

        assert!(matches!(result, Err(AgentError::GatewayError(_))));
    }

    #[tokio::test]
    async fn test_reconfigure_applies_to_later_calls() {
        let gateway = Arc::new(MockGateway::replying(&["ok"]));
        let mut broker = LlmBroker::new("gpt-4o", gateway.clone());

        broker.reconfigure("gpt-4o-mini", 1.2).unwrap();
        broker.ask("Hi").await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls[0].model, "gpt-4o-mini");
        assert_eq!(calls[0].temperature, 1.2);
    }

    #[test]
    fn test_reconfigure_rejects_invalid_settings() {
        let gateway = Arc::new(MockGateway::new(vec![]));
        let mut broker = LlmBroker::new("gpt-4o", gateway);

        assert!(broker.reconfigure("gpt-5", 0.7).is_err());
        assert!(broker.reconfigure("gpt-4o-mini", 2.5).is_err());
        assert_eq!(broker.model(), "gpt-4o");
        assert_eq!(broker.temperature(), 0.7);
    }
}
