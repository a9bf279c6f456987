mod openai;

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use vibes_core::{classify_intent_keywords, IntentCatalog, IntentSource, ResolvedIntent};

pub use openai::{OpenAiClassifierConfig, OpenAiIntentClassifier};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("classifier reply was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fallback classifier consulted when no keyword matches.
///
/// `Ok(None)` means the service answered without naming an intent.
pub trait IntentClassifier: Send + Sync {
    fn classify(
        &self,
        query: &str,
        known_intents: &[&str],
    ) -> impl Future<Output = Result<Option<String>, ClassifierError>> + Send;
}

pub struct IntentExtractor<C> {
    catalog: Arc<IntentCatalog>,
    fallback: Option<C>,
}

impl<C: IntentClassifier> IntentExtractor<C> {
    pub fn new(catalog: Arc<IntentCatalog>, fallback: Option<C>) -> Self {
        Self { catalog, fallback }
    }

    pub fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub async fn extract_intent(&self, query: &str) -> String {
        self.resolve(query).await.intent
    }

    /// Keyword rules first, then the optional classifier, then `unclear_intent`.
    /// Classifier problems never reach the caller.
    pub async fn resolve(&self, query: &str) -> ResolvedIntent {
        if let Some(hit) = classify_intent_keywords(&self.catalog, query) {
            return ResolvedIntent {
                intent: hit.id.clone(),
                source: IntentSource::Keyword,
            };
        }

        if let Some(classifier) = self.fallback.as_ref() {
            let known = self.catalog.ids().collect::<Vec<_>>();

            match classifier.classify(query, &known).await {
                Ok(Some(label)) if self.catalog.contains(&label) => {
                    return ResolvedIntent {
                        intent: label,
                        source: IntentSource::Classifier,
                    };
                }
                Ok(Some(label)) => debug!(label = %label, "classifier named an unknown intent"),
                Ok(None) => debug!("classifier returned no intent"),
                Err(err) => debug!(error = %err, "classifier fallback failed"),
            }
        }

        ResolvedIntent::unclear()
    }
}
