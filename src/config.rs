//! Runtime configuration.
//!
//! Values come from the process environment (a `.env` file is loaded by the binary before
//! this runs) and may be overridden from the command line.

use crate::error::{AgentError, Result};
use crate::llm::gateways::openai::DEFAULT_OPENAI_ENDPOINT;

pub const DEFAULT_STOCK_API_BASE: &str = "https://dsquaredbsas.replit.app/api/ai";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Models the assistant may be switched to.
pub const SUPPORTED_MODELS: [&str; 3] = ["gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo"];

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_endpoint: String,
    pub stock_api_base: String,
    pub model: String,
    pub temperature: f32,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let temperature = match lookup("AGENTPRO_TEMPERATURE") {
            Some(raw) => raw.trim().parse::<f32>().map_err(|_| {
                AgentError::ConfigError(format!("AGENTPRO_TEMPERATURE is not a number: {raw}"))
            })?,
            None => DEFAULT_TEMPERATURE,
        };

        Ok(Self {
            openai_api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            openai_endpoint: lookup("OPENAI_API_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string()),
            stock_api_base: lookup("STOCK_API_BASE")
                .unwrap_or_else(|| DEFAULT_STOCK_API_BASE.to_string()),
            model: lookup("AGENTPRO_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
        })
    }

    /// Apply command-line overrides on top of environment values.
    pub fn with_overrides(mut self, model: Option<String>, temperature: Option<f32>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(temperature) = temperature {
            self.temperature = temperature;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.trim().is_empty() {
            return Err(AgentError::ConfigError("OPENAI_API_KEY is not set".to_string()));
        }
        validate_model(&self.model)?;
        validate_temperature(self.temperature)
    }
}

pub fn validate_model(model: &str) -> Result<()> {
    if SUPPORTED_MODELS.contains(&model) {
        Ok(())
    } else {
        Err(AgentError::ConfigError(format!(
            "unsupported model '{}', expected one of: {}",
            model,
            SUPPORTED_MODELS.join(", ")
        )))
    }
}

pub fn validate_temperature(temperature: f32) -> Result<()> {
    if (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        Ok(())
    } else {
        Err(AgentError::ConfigError(format!(
            "temperature {} outside {}..={}",
            temperature, MIN_TEMPERATURE, MAX_TEMPERATURE
        )))
    }
}
