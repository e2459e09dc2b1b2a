//! Model-assisted mapping of a follow-up message onto previously shown products.

use crate::catalog::Product;
use crate::llm::LlmBroker;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static INDEX_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]").expect("valid index list regex"));

const DISAMBIGUATION_RULES: &str = "Si la pregunta hace referencia explícita a uno o más productos del listado (por ejemplo, usando color, orden, o diciendo 'de estos', 'la segunda', etc.), responde SOLO con una lista de índices (por ejemplo: [1] o [2,3]) de los productos a los que se refiere el usuario. \
Si la pregunta es una nueva consulta sobre otra marca, tipo, o no hace referencia a productos previos, responde [].\n\
Ejemplos:\n\
Listado:\n\
1. Nombre: Remera Balenciaga, Marca: Balenciaga, Color: Negro\n\
2. Nombre: Remera Off-White, Marca: Off-White, Color: Blanco\n\
Pregunta: '¿La blanca en qué talles está?'\n\
Respuesta: [2]\n\
Pregunta: '¿Y la negra?'\n\
Respuesta: [1]\n\
Pregunta: '¿Qué remeras de Gucci tenés?'\n\
Respuesta: []\n\
Pregunta: '¿De estos, la segunda?'\n\
Respuesta: [2]\n\
Pregunta: '¿Y de Off-White qué tenés?'\n\
Respuesta: []\n";

fn listing(products: &[Product]) -> String {
    products
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{}. Nombre: {}, Marca: {}, Color: {}, Talles: [{}]",
                i + 1,
                p.name,
                p.brand,
                p.color,
                p.available_sizes().join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_disambiguation_prompt(products: &[Product], query: &str) -> String {
    format!(
        "Dado el siguiente listado de productos ofrecidos:\n{}\nY la pregunta del usuario: '{}'\n{}",
        listing(products),
        query,
        DISAMBIGUATION_RULES
    )
}

/// Read the first bracketed list in `raw` as 1-based indices.
///
/// Entries that are not plain non-negative integers are skipped. The flag tells whether a
/// bracketed list was found at all.
pub fn parse_indices(raw: &str) -> (Vec<usize>, bool) {
    match INDEX_LIST.captures(raw) {
        Some(caps) => {
            let indices = caps[1]
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty() && item.chars().all(|c| c.is_ascii_digit()))
                .filter_map(|item| item.parse::<usize>().ok())
                .collect();
            (indices, true)
        }
        None => (Vec::new(), false),
    }
}

/// Indices (1-based, unchecked against `products`) of the items `query` refers to.
///
/// Any failure, including a model error, yields an empty list.
pub async fn disambiguate(broker: &LlmBroker, products: &[Product], query: &str) -> Vec<usize> {
    if products.is_empty() {
        return Vec::new();
    }

    let raw = match broker.ask(build_disambiguation_prompt(products, query)).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Disambiguation call failed: {}", e);
            return Vec::new();
        }
    };

    let (indices, parsed) = parse_indices(&raw);
    if !parsed {
        debug!("Disambiguation reply had no index list");
    }
    indices
}
