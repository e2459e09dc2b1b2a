//! The showroom assistant: turns a free-text question into a product answer, keeping
//! track of what was shown so follow-ups can refer back to it.

pub mod attributes;
pub mod composer;
pub mod disambiguation;
pub mod resolver;
pub mod session;

pub use attributes::{extract_attributes, parse_attribute_filter};
pub use composer::{compose, compose_reply, ComposedReply, ProductCard, ProductDisplay};
pub use disambiguation::{disambiguate, parse_indices};
pub use resolver::{is_new_query, looks_like_follow_up, resolve, QueryKind, Resolution};
pub use session::{SessionState, ShowroomAssistant, TurnReply};
