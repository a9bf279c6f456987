pub mod catalog;
pub mod geo;
pub mod intent;
pub mod models;
pub mod ranking;

pub use catalog::{CatalogError, IntentCatalog, IntentDefinition};
pub use geo::{distance_m, haversine_m};
pub use intent::classify_intent_keywords;
pub use models::*;
pub use ranking::rank;
