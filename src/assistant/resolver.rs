//! Decides per turn whether a message starts a new search or refers back to the products
//! shown last.

use crate::assistant::disambiguation::disambiguate;
use crate::catalog::{AttributeFilter, Product};
use crate::llm::LlmBroker;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Browsing: show what matches.
    Exploration,
    /// Picking among products already shown.
    Selection,
    /// Asking for stock of a specific size.
    Stock,
}

/// Phrases that usually point back at earlier results.
pub const FOLLOW_UP_KEYWORDS: [&str; 10] = [
    "de estas",
    "de los que me mostraste",
    "de los anteriores",
    "la blanca",
    "la negra",
    "la primera",
    "la segunda",
    "la tercera",
    "la de color",
    "la que es",
];

/// Keyword heuristic, only used for diagnostics.
pub fn looks_like_follow_up(query: &str) -> bool {
    let query = query.to_lowercase();
    FOLLOW_UP_KEYWORDS.iter().any(|kw| query.contains(kw))
}

/// True when `filter` names a brand or type the previous products cannot account for.
///
/// Brands compare case-insensitively against the previous brand set. The type only needs
/// to appear as a substring of some previous product name. With no previous products this
/// is always false.
pub fn is_new_query(filter: &AttributeFilter, previous: &[Product]) -> bool {
    if previous.is_empty() {
        return false;
    }

    let brands: HashSet<String> = previous
        .iter()
        .filter(|p| !p.brand.is_empty())
        .map(|p| p.brand.to_lowercase())
        .collect();
    let names: Vec<String> = previous
        .iter()
        .filter(|p| !p.name.is_empty())
        .map(|p| p.name.to_lowercase())
        .collect();

    let brand = filter.brand.to_lowercase();
    let product_type = filter.product_type.to_lowercase();

    let unknown_brand = !brand.is_empty() && !brands.contains(&brand);
    let unknown_type = !product_type.is_empty() && names.iter().all(|n| !n.contains(&product_type));

    unknown_brand || unknown_type
}

/// Outcome of context resolution for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub kind: QueryKind,
    /// Products picked from the previous context, when the context answered the turn.
    pub products: Option<Vec<Product>>,
    pub fresh_query_needed: bool,
    /// The fallback picked the last shown product without a clear reference.
    pub confirmation_pending: bool,
}

impl Resolution {
    fn fresh(filter: &AttributeFilter) -> Self {
        let kind = if filter.size.is_empty() {
            QueryKind::Exploration
        } else {
            QueryKind::Stock
        };

        Self {
            kind,
            products: None,
            fresh_query_needed: true,
            confirmation_pending: false,
        }
    }

    fn selection(products: Vec<Product>, confirmation_pending: bool) -> Self {
        Self {
            kind: QueryKind::Selection,
            products: Some(products),
            fresh_query_needed: false,
            confirmation_pending,
        }
    }
}

/// Resolve `query` against the products shown in the previous turn.
///
/// A new query or an empty context asks for a fresh search. Otherwise the model maps the
/// message onto previous items; when it cannot, the last shown product is used and the
/// reply must ask the user to confirm.
pub async fn resolve(
    broker: &LlmBroker,
    query: &str,
    filter: &AttributeFilter,
    previous: &[Product],
) -> Resolution {
    let new_query = is_new_query(filter, previous);
    debug!(
        new_query,
        follow_up_phrase = looks_like_follow_up(query),
        previous = previous.len(),
        "Resolving turn context"
    );

    if previous.is_empty() || new_query {
        return Resolution::fresh(filter);
    }

    let indices = disambiguate(broker, previous, query).await;

    if indices.is_empty() {
        info!("No product reference understood, falling back to last shown product");
        let last = previous[previous.len() - 1].clone();
        return Resolution::selection(vec![last], true);
    }

    let selected: Vec<Product> = indices
        .iter()
        .filter(|&&i| (1..=previous.len()).contains(&i))
        .map(|&i| previous[i - 1].clone())
        .collect();

    if selected.is_empty() {
        debug!(?indices, "Every index out of range, searching again");
        return Resolution::fresh(filter);
    }

    Resolution::selection(selected, false)
}
