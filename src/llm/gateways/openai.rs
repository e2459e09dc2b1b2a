//! OpenAI Gateway for LLM interactions.
//!
//! Sends role-tagged transcripts to the chat-completions endpoint of an OpenAI-compatible
//! API and returns the first choice's text.

use crate::error::{AgentError, Result};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::LlmMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Configuration for connecting to OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<std::time::Duration>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_API_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_OPENAI_ENDPOINT.to_string()),
            timeout: None,
        }
    }
}

/// Gateway for OpenAI LLM service.
pub struct OpenAIGateway {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIGateway {
    /// Create a new OpenAI gateway with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(OpenAIConfig::default())
    }

    /// Create a new OpenAI gateway with custom configuration.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(OpenAIConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: None,
        })
    }

    fn request_body(model: &str, messages: &[LlmMessage], config: &CompletionConfig) -> Value {
        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": config.temperature,
        });

        if let Some(max_tokens) = config.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }
}

#[async_trait]
impl LlmGateway for OpenAIGateway {
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        config: &CompletionConfig,
    ) -> Result<String> {
        info!("Delegating to OpenAI for completion");
        debug!("Model: {}, Message count: {}", model, messages.len());

        let body = Self::request_body(model, messages, config);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url.trim_end_matches('/')))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::GatewayError(format!(
                "OpenAI API error: {} - {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;

        response_body["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AgentError::GatewayError("No content in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_with_api_key_and_base_url() {
        let gateway = OpenAIGateway::with_api_key_and_base_url("key", "https://custom.com").unwrap();
        assert_eq!(gateway.config.api_key, "key");
        assert_eq!(gateway.config.base_url, "https://custom.com");
        assert!(gateway.config.timeout.is_none());
    }

    #[test]
    fn test_request_body_omits_max_tokens_when_unset() {
        let messages = vec![LlmMessage::user("Hola")];
        let body = OpenAIGateway::request_body("gpt-4o", &messages, &CompletionConfig::default());

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hola");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_request_body_includes_max_tokens() {
        let config = CompletionConfig {
            temperature: 0.2,
            max_tokens: Some(64),
        };
        let body = OpenAIGateway::request_body("gpt-4o-mini", &[], &config);

        assert_eq!(body["max_tokens"], 64);
    }

    #[tokio::test]
    async fn test_complete_simple() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"¡Hola!"}}]}"#)
            .create_async()
            .await;

        let gateway = OpenAIGateway::with_api_key_and_base_url("test-key", server.url()).unwrap();
        let messages = vec![LlmMessage::user("Hola")];

        let result = gateway.complete("gpt-4o", &messages, &CompletionConfig::default()).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "¡Hola!");
    }

    #[tokio::test]
    async fn test_complete_sends_transcript_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model":"gpt-4o","messages":[{"role":"user","content":"a"},{"role":"assistant","content":"b"},{"role":"user","content":"c"}]}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"d"}}]}"#)
            .create_async()
            .await;

        let gateway = OpenAIGateway::with_api_key_and_base_url("k", server.url()).unwrap();
        let messages = vec![
            LlmMessage::user("a"),
            LlmMessage::assistant("b"),
            LlmMessage::user("c"),
        ];

        let result = gateway.complete("gpt-4o", &messages, &CompletionConfig::default()).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "d");
    }

    #[tokio::test]
    async fn test_complete_error_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let gateway = OpenAIGateway::with_api_key_and_base_url("bad", server.url()).unwrap();
        let result = gateway.complete("gpt-4o", &[], &CompletionConfig::default()).await;

        mock.assert_async().await;
        match result {
            Err(AgentError::GatewayError(msg)) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("invalid api key"));
            }
            other => panic!("Expected GatewayError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_missing_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let gateway = OpenAIGateway::with_api_key_and_base_url("k", server.url()).unwrap();
        let result = gateway.complete("gpt-4o", &[], &CompletionConfig::default()).await;

        assert!(matches!(result, Err(AgentError::GatewayError(_))));
    }
}
