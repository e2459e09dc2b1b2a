//! Per-session state and the turn pipeline:
//! extraction, context resolution, optional stock search, reply composition.

use crate::assistant::attributes::extract_attributes;
use crate::assistant::composer::{compose_reply, ProductDisplay, CONFIRMATION_NOTICE};
use crate::assistant::resolver::resolve;
use crate::catalog::{Product, ProductSource, SearchResult};
use crate::error::Result;
use crate::llm::{LlmBroker, LlmMessage};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Everything a showroom conversation carries from one turn to the next.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    transcript: Vec<LlmMessage>,
    last_products: Vec<Product>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: Vec::new(),
            last_products: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &[LlmMessage] {
        &self.transcript
    }

    /// Products shown by the last successful fresh search.
    pub fn last_products(&self) -> &[Product] {
        &self.last_products
    }

    /// Empty the transcript. The product context is only replaced by a fresh search.
    pub fn clear(&mut self) {
        self.transcript.clear();
    }
}

/// What the user sees for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub text: String,
    pub display: Option<ProductDisplay>,
}

/// Runs showroom turns against a model and a product source.
pub struct ShowroomAssistant {
    broker: LlmBroker,
    source: Arc<dyn ProductSource>,
}

impl ShowroomAssistant {
    pub fn new(broker: LlmBroker, source: Arc<dyn ProductSource>) -> Self {
        Self { broker, source }
    }

    pub fn broker(&self) -> &LlmBroker {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut LlmBroker {
        &mut self.broker
    }

    /// Process one user message.
    ///
    /// Failures inside the turn become an error reply; the returned state stays usable.
    /// The user message and the reply are appended to the transcript either way.
    pub async fn process_turn(&self, mut state: SessionState, query: &str) -> (SessionState, TurnReply) {
        state.transcript.push(LlmMessage::user(query));

        let reply = match self.run_turn(&mut state.last_products, query).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(session = %state.id, "Turn failed: {}", e);
                TurnReply {
                    text: format!("❌ Error: {}", e),
                    display: None,
                }
            }
        };

        state.transcript.push(LlmMessage::assistant(&reply.text));
        (state, reply)
    }

    async fn run_turn(&self, last_products: &mut Vec<Product>, query: &str) -> Result<TurnReply> {
        let filter = extract_attributes(&self.broker, query).await;
        let resolution = resolve(&self.broker, query, &filter, last_products.as_slice()).await;

        let result = match resolution.products {
            Some(products) => Some(SearchResult::from_products(products)),
            None => {
                let result = self.source.search(&filter).await?;
                match &result {
                    Some(found) if !found.matches.is_empty() => {
                        *last_products = found.matches.clone();
                    }
                    _ => last_products.clear(),
                }
                result
            }
        };

        info!(
            kind = ?resolution.kind,
            shown = result.as_ref().map_or(0, |r| r.matches.len()),
            confirmation_pending = resolution.confirmation_pending,
            "Turn resolved"
        );

        let composed = compose_reply(&filter, result.as_ref(), resolution.kind);
        let text = if resolution.confirmation_pending {
            format!("{}\n\n{}", CONFIRMATION_NOTICE, composed.text)
        } else {
            composed.text
        };

        Ok(TurnReply {
            text,
            display: composed.display,
        })
    }
}
