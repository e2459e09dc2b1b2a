pub mod assistant;
pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;

pub use error::{AgentError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::assistant::{SessionState, ShowroomAssistant, TurnReply};
    pub use crate::catalog::{AttributeFilter, Product, ProductSource, StockApiClient};
    pub use crate::config::AppConfig;
    pub use crate::error::{AgentError, Result};
    pub use crate::llm::gateways::OpenAIGateway;
    pub use crate::llm::{ChatSession, LlmBroker, LlmGateway, LlmMessage, MessageRole};
}
