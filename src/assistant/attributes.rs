//! Attribute extraction: free text to [`AttributeFilter`] through the model.

use crate::catalog::AttributeFilter;
use crate::llm::LlmBroker;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// First `{` through last `}`, across lines.
static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON block regex"));

const EXTRACTION_INSTRUCTIONS: &str = "Eres un extractor de atributos para un sistema de stock de prendas de lujo. \
Dada una consulta de usuario, responde SOLO con un JSON válido y nada más. \
El JSON debe tener las claves: brand, type, color, size. Si algún dato no está, déjalo vacío. \
Ejemplos:\n\
'¿Hay remeras Gucci verde en talle M?' => {\"brand\":\"Gucci\",\"type\":\"remera\",\"color\":\"verde\",\"size\":\"M\"}\n\
'¿Tienen pantalones Louis Vuitton negros?' => {\"brand\":\"Louis Vuitton\",\"type\":\"pantalón\",\"color\":\"negro\",\"size\":\"\"}\n\
'¿Hay camperas Moncler?' => {\"brand\":\"Moncler\",\"type\":\"campera\",\"color\":\"\",\"size\":\"\"}\n\
'¿Remeras talle S?' => {\"brand\":\"\",\"type\":\"remera\",\"color\":\"\",\"size\":\"S\"}\n\
'¿Hay algo de Dior?' => {\"brand\":\"Dior\",\"type\":\"\",\"color\":\"\",\"size\":\"\"}\n";

pub fn build_extraction_prompt(query: &str) -> String {
    format!("{}Consulta: '{}'", EXTRACTION_INSTRUCTIONS, query)
}

/// Parse the model's reply into a filter.
///
/// Returns the filter and whether parsing succeeded. Any failure yields the all-empty
/// filter.
pub fn parse_attribute_filter(raw: &str) -> (AttributeFilter, bool) {
    let Some(block) = JSON_BLOCK.find(raw) else {
        return (AttributeFilter::default(), false);
    };

    match serde_json::from_str::<AttributeFilter>(block.as_str()) {
        Ok(filter) => (filter, true),
        Err(e) => {
            debug!("Discarding malformed attribute JSON: {}", e);
            (AttributeFilter::default(), false)
        }
    }
}

/// Ask the model for the attributes mentioned in `query`.
///
/// Never fails: a model error or an unusable reply gives the empty filter.
pub async fn extract_attributes(broker: &LlmBroker, query: &str) -> AttributeFilter {
    let raw = match broker.ask(build_extraction_prompt(query)).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Attribute extraction call failed: {}", e);
            return AttributeFilter::default();
        }
    };

    let (filter, parsed) = parse_attribute_filter(&raw);
    if !parsed {
        warn!("Attribute extraction reply had no usable JSON");
    }
    debug!(?filter, "Extracted attributes");
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockGateway;
    use std::sync::Arc;

    fn broker(responses: Vec<std::result::Result<String, String>>) -> (LlmBroker, Arc<MockGateway>) {
        let gateway = Arc::new(MockGateway::new(responses));
        (LlmBroker::new("gpt-4o", gateway.clone()), gateway)
    }

    #[test]
    fn test_prompt_embeds_query_and_examples() {
        let prompt = build_extraction_prompt("¿Hay camperas Moncler?");

        assert!(prompt.ends_with("Consulta: '¿Hay camperas Moncler?'"));
        assert!(prompt.contains("brand, type, color, size"));
        assert_eq!(prompt.matches(" => {").count(), 5);
    }

    #[test]
    fn test_parse_plain_json() {
        let (filter, ok) = parse_attribute_filter(
            r#"{"brand":"Gucci","type":"remera","color":"verde","size":"M"}"#,
        );

        assert!(ok);
        assert_eq!(filter.brand, "Gucci");
        assert_eq!(filter.product_type, "remera");
        assert_eq!(filter.color, "verde");
        assert_eq!(filter.size, "M");
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let raw = "Claro, acá está:\n```json\n{\n  \"brand\": \"Dior\",\n  \"type\": \"\",\n  \"color\": \"\",\n  \"size\": \"\"\n}\n```";

        let (filter, ok) = parse_attribute_filter(raw);

        assert!(ok);
        assert_eq!(filter.brand, "Dior");
        assert_eq!(filter.product_type, "");
    }

    #[test]
    fn test_parse_without_json_block() {
        let (filter, ok) = parse_attribute_filter("No entiendo la consulta");

        assert!(!ok);
        assert_eq!(filter, AttributeFilter::default());
    }

    #[test]
    fn test_parse_malformed_json() {
        let (filter, ok) = parse_attribute_filter(r#"{"brand": "Gucci", "type": }"#);

        assert!(!ok);
        assert_eq!(filter, AttributeFilter::default());
    }

    #[test]
    fn test_parse_non_string_value_degrades() {
        let (filter, ok) = parse_attribute_filter(r#"{"brand":"Gucci","size":42}"#);

        assert!(!ok);
        assert!(filter.is_empty());
    }

    #[tokio::test]
    async fn test_extract_uses_model_reply() {
        let (broker, gateway) = broker(vec![Ok(
            r#"{"brand":"Louis Vuitton","type":"pantalón","color":"negro","size":""}"#.to_string(),
        )]);

        let filter = extract_attributes(&broker, "¿Tienen pantalones Louis Vuitton negros?").await;

        assert_eq!(filter.brand, "Louis Vuitton");
        assert_eq!(filter.color, "negro");
        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].messages[0].content.contains("pantalones Louis Vuitton negros"));
    }

    #[tokio::test]
    async fn test_extract_swallows_model_error() {
        let (broker, _) = broker(vec![Err("503 Service Unavailable".to_string())]);

        let filter = extract_attributes(&broker, "¿Hay algo de Dior?").await;

        assert_eq!(filter, AttributeFilter::default());
    }

    #[tokio::test]
    async fn test_extract_garbage_reply_is_empty_filter() {
        let (broker, _) = broker(vec![Ok("lo siento, no puedo ayudar".to_string())]);

        let filter = extract_attributes(&broker, "hola").await;

        assert!(filter.is_empty());
    }
}
