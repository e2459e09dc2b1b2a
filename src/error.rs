//! Error types and result aliases for AgentPRO.
//!
//! This module defines the crate error type [`AgentError`] and the [`Result`] alias used
//! by every fallible API. Stages of the showroom pipeline that must never fail (attribute
//! extraction, disambiguation, stock search) convert these errors into neutral defaults at
//! their own boundary; the rest propagate with `?`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
