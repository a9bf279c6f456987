use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed reading intent mapping at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed intent mapping: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("intent mapping defines no intents")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct RawIntent {
    #[serde(default)]
    keywords: Vec<String>,
    types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentDefinition {
    pub id: String,
    pub keywords: Vec<String>,
    pub categories: Vec<String>,
}

/// Intent definitions in mapping-file order. Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct IntentCatalog {
    intents: Vec<IntentDefinition>,
}

impl IntentCatalog {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let parsed: IndexMap<String, RawIntent> = serde_json::from_str(raw)?;
        if parsed.is_empty() {
            return Err(CatalogError::Empty);
        }

        let intents = parsed
            .into_iter()
            .map(|(id, raw)| IntentDefinition {
                id,
                keywords: raw
                    .keywords
                    .into_iter()
                    .map(|keyword| keyword.to_lowercase())
                    .filter(|keyword| !keyword.is_empty())
                    .collect(),
                categories: raw.types,
            })
            .collect();

        Ok(Self { intents })
    }

    pub fn get(&self, id: &str) -> Option<&IntentDefinition> {
        self.intents.iter().find(|intent| intent.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.intents.iter().map(|intent| intent.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntentDefinition> {
        self.intents.iter()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}
