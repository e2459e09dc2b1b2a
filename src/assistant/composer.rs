//! Reply text and product cards for a resolved turn.

use crate::assistant::resolver::QueryKind;
use crate::catalog::{AttributeFilter, Product, SearchResult};
use std::fmt;

pub const NOT_FOUND_MESSAGE: &str =
    "No se encontró ese producto en el stock. ¿Quieres que busque algo similar?";
pub const NO_STOCK_MESSAGE: &str = "No hay stock disponible para ese producto.";
pub const SELECTION_MESSAGE: &str = "Aquí tienes la información del producto que seleccionaste. Si quieres saber más, dime el talle o color que te interesa.";
pub const EXPLORATION_PLURAL_MESSAGE: &str = "Estos son los modelos que tenemos disponibles:";
pub const EXPLORATION_SINGULAR_MESSAGE: &str = "Este es el modelo que tenemos disponible:";
pub const CONFIRMATION_NOTICE: &str = "No entendí a qué producto te refieres exactamente, así que te muestro información del último producto ofrecido. ¿Te refieres a este? Si no, por favor aclara a cuál te refieres.";
pub const ASK_WHICH_PROMPT: &str = "¿Te refieres a alguno de estos modelos?";

/// At most this many products are shown per reply.
pub const MAX_CARDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub image_url: String,
    pub name: String,
    pub brand: String,
    pub color: String,
    /// Comma-joined available sizes, `Ninguno` when none.
    pub sizes: String,
    pub price: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        let sizes = product.available_sizes();
        Self {
            image_url: product.image_url.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            color: product.color.clone(),
            sizes: if sizes.is_empty() {
                "Ninguno".to_string()
            } else {
                sizes.join(", ")
            },
            price: match &product.price {
                Some(price) => format!("${}", price),
                None => "a consultar".to_string(),
            },
        }
    }
}

impl fmt::Display for ProductCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**{}**", self.name)?;
        writeln!(f, "Marca: {}", self.brand)?;
        writeln!(f, "Color: {}", self.color)?;
        writeln!(f, "Talles disponibles: {}", self.sizes)?;
        writeln!(f, "Precio: {}", self.price)?;
        write!(f, "Imagen: {}", self.image_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDisplay {
    pub cards: Vec<ProductCard>,
    /// Ask the user which of several selected products they mean.
    pub ask_which: bool,
}

/// Cards for the first [`MAX_CARDS`] products, or `None` when there is nothing to show.
pub fn display_for(matches: &[Product], kind: QueryKind) -> Option<ProductDisplay> {
    if matches.is_empty() {
        return None;
    }

    Some(ProductDisplay {
        cards: matches.iter().take(MAX_CARDS).map(ProductCard::from).collect(),
        ask_which: kind == QueryKind::Selection && matches.len() > 1,
    })
}

/// Reply text for a turn.
///
/// A missing or empty result always gives [`NOT_FOUND_MESSAGE`], whatever the kind.
pub fn compose(filter: &AttributeFilter, result: Option<&SearchResult>, kind: QueryKind) -> String {
    let Some(result) = result.filter(|r| !r.is_empty()) else {
        return NOT_FOUND_MESSAGE.to_string();
    };
    let matches = &result.matches;
    let product = &matches[0];

    match kind {
        QueryKind::Stock if !filter.size.is_empty() => stock_message(product),
        QueryKind::Selection => SELECTION_MESSAGE.to_string(),
        _ if matches.len() > 1 => EXPLORATION_PLURAL_MESSAGE.to_string(),
        _ => EXPLORATION_SINGULAR_MESSAGE.to_string(),
    }
}

fn stock_message(product: &Product) -> String {
    if let Some(requested) = product.requested_size.as_ref().filter(|s| s.available) {
        return format!(
            "Sí, hay stock de {} {} {} en talle {}. Quedan {} unidades.",
            product.name, product.brand, product.color, requested.value, requested.stock
        );
    }

    let available = product.available_sizes();
    if available.is_empty() {
        NO_STOCK_MESSAGE.to_string()
    } else {
        format!(
            "No hay stock en ese talle, pero sí en los talles: {}.",
            available.join(", ")
        )
    }
}

/// Text and display produced together for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReply {
    pub text: String,
    pub display: Option<ProductDisplay>,
}

pub fn compose_reply(
    filter: &AttributeFilter,
    result: Option<&SearchResult>,
    kind: QueryKind,
) -> ComposedReply {
    let display = result.and_then(|r| display_for(&r.matches, kind));
    let text = compose(filter, result, kind);

    ComposedReply { text, display }
}
