pub mod broker;
pub mod chat_session;
pub mod gateway;
pub mod gateways;
pub mod models;

#[cfg(test)]
pub(crate) mod mock;

pub use broker::LlmBroker;
pub use chat_session::ChatSession;
pub use gateway::{CompletionConfig, LlmGateway};
pub use models::{LlmMessage, MessageRole};
