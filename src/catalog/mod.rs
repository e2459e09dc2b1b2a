//! Product catalog: the stock API data model, the [`ProductSource`] seam and local filtering.

pub mod client;

pub use client::{ProductSource, StockApiClient};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Structured filter extracted from a user query.
///
/// Every field is an empty string when the query does not mention it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilter {
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub product_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: String,
}

/// `null` reads as the type's default, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl AttributeFilter {
    pub fn is_empty(&self) -> bool {
        self.brand.is_empty()
            && self.product_type.is_empty()
            && self.color.is_empty()
            && self.size.is_empty()
    }

    /// Search parameters for the non-empty fields, in a fixed order.
    pub fn query_params(&self) -> Vec<(&'static str, &str)> {
        [
            ("brand", self.brand.as_str()),
            ("type", self.product_type.as_str()),
            ("color", self.color.as_str()),
            ("size", self.size.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: i64,
}

/// List price as the stock API sends it: usually a number, sometimes preformatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(serde_json::Number),
    Label(String),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(amount) => write!(f, "{}", amount),
            Price::Label(label) => f.write_str(label),
        }
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Price::Amount(amount.into())
    }
}

/// Anything other than a number or non-blank text counts as no price.
fn lenient_price<'de, D>(deserializer: D) -> std::result::Result<Option<Price>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(amount)) => Some(Price::Amount(amount)),
        Some(Value::String(label)) if !label.trim().is_empty() => {
            Some(Price::Label(label.trim().to_string()))
        }
        _ => None,
    })
}

/// Product snapshot as returned by the stock API.
///
/// Fields the API leaves `null` read as empty so one sparse record does not sink the
/// whole search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<Price>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sizes: Vec<SizeStock>,
    #[serde(default)]
    pub requested_size: Option<SizeStock>,
}

impl Product {
    /// Size labels currently in stock, in catalog order.
    pub fn available_sizes(&self) -> Vec<&str> {
        self.sizes
            .iter()
            .filter(|s| s.available)
            .map(|s| s.value.as_str())
            .collect()
    }
}

/// Payload of `GET /products/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_found: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub matches: Vec<Product>,
}

impl SearchResult {
    pub fn from_products(products: Vec<Product>) -> Self {
        Self {
            total_found: products.len(),
            matches: products,
        }
    }

    /// True when there is nothing to show, whatever `totalFound` claims.
    pub fn is_empty(&self) -> bool {
        self.total_found == 0 || self.matches.is_empty()
    }
}

/// Narrow an already fetched product list without calling the API.
///
/// Every non-empty attribute is a case-insensitive substring test: color against the
/// product color, type against the name or the category, brand against the brand. Size
/// is not applied locally.
pub fn filter_products(products: &[Product], filter: &AttributeFilter) -> Vec<Product> {
    let color = filter.color.to_lowercase();
    let product_type = filter.product_type.to_lowercase();
    let brand = filter.brand.to_lowercase();

    products
        .iter()
        .filter(|p| color.is_empty() || p.color.to_lowercase().contains(&color))
        .filter(|p| {
            product_type.is_empty()
                || p.name.to_lowercase().contains(&product_type)
                || p.category.to_lowercase().contains(&product_type)
        })
        .filter(|p| brand.is_empty() || p.brand.to_lowercase().contains(&brand))
        .cloned()
        .collect()
}
