use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use vibes_core::{
    rank, IntentCatalog, LatLng, PlaceCandidate, RankedPlace, ResolvedIntent, VibeRequest,
    VibeResponse, DEFAULT_RADIUS_M,
};
use vibes_intent::{
    IntentClassifier, IntentExtractor, OpenAiClassifierConfig, OpenAiIntentClassifier,
};
use vibes_observability::AppMetrics;
use vibes_places::{CandidateLocator, GooglePlacesClient, PlacesConfig, PlacesDirectory};

pub const DEFAULT_MAPPER_PATH: &str = "config/vibe_mapper.json";

pub type DefaultVibeAgent = VibeAgent<GooglePlacesClient, OpenAiIntentClassifier>;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AgentCapabilities {
    pub places_directory: bool,
    pub intent_classifier: bool,
}

pub struct VibeAgent<D, C> {
    catalog: Arc<IntentCatalog>,
    extractor: Arc<IntentExtractor<C>>,
    locator: Arc<CandidateLocator<D>>,
    metrics: Arc<AppMetrics>,
}

impl<D, C> Clone for VibeAgent<D, C> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            extractor: self.extractor.clone(),
            locator: self.locator.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<D, C> VibeAgent<D, C>
where
    D: PlacesDirectory,
    C: IntentClassifier,
{
    pub fn new(
        catalog: Arc<IntentCatalog>,
        directory: Option<D>,
        classifier: Option<C>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            extractor: Arc::new(IntentExtractor::new(catalog.clone(), classifier)),
            locator: Arc::new(CandidateLocator::new(catalog.clone(), directory)),
            catalog,
            metrics,
        }
    }

    pub fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    pub fn capabilities(&self) -> AgentCapabilities {
        AgentCapabilities {
            places_directory: self.locator.has_directory(),
            intent_classifier: self.extractor.has_fallback(),
        }
    }

    pub async fn resolve_intent(&self, query: &str) -> ResolvedIntent {
        let resolved = self.extractor.resolve(query).await;
        self.metrics.record_intent(resolved.source);
        resolved
    }

    pub async fn search(&self, intent: &str, origin: LatLng, radius_m: u32) -> Vec<PlaceCandidate> {
        let candidates = self.locator.search_nearby(intent, origin, radius_m).await;
        self.metrics.add_candidates(candidates.len());
        candidates
    }

    pub fn rank(
        &self,
        candidates: Vec<PlaceCandidate>,
        intent: &str,
        scene_tags: &[String],
    ) -> Vec<RankedPlace> {
        let ranked = rank(candidates, intent, scene_tags);
        self.metrics.add_recommendations(ranked.len());
        ranked
    }

    #[instrument(skip_all, fields(request_id = tracing::field::Empty))]
    pub async fn recommend(&self, request: VibeRequest) -> VibeResponse {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));
        self.metrics.inc_request();

        let resolved = self.resolve_intent(&request.query).await;
        let radius_m = request.radius_m.unwrap_or(DEFAULT_RADIUS_M);
        let candidates = self
            .search(&resolved.intent, request.location, radius_m)
            .await;
        let candidates_considered = candidates.len();
        let recommendations = self.rank(candidates, &resolved.intent, &request.scene_tags);

        self.metrics.observe_latency(started.elapsed());
        info!(
            intent = %resolved.intent,
            intent_source = resolved.source.as_str(),
            candidates = candidates_considered,
            recommendations = recommendations.len(),
            "recommendation handled"
        );

        VibeResponse {
            request_id,
            intent: resolved.intent,
            intent_source: resolved.source,
            candidates_considered,
            recommendations,
            generated_at: Utc::now(),
        }
    }
}

/// Catalog from `mapper_path`; directory and classifier from the environment when
/// their credentials are present.
pub fn build_agent_from_env(
    mapper_path: impl AsRef<Path>,
    metrics: Arc<AppMetrics>,
) -> Result<DefaultVibeAgent> {
    let mapper_path = mapper_path.as_ref();
    let catalog = IntentCatalog::from_path(mapper_path).with_context(|| {
        format!(
            "failed loading intent mapping from {}",
            mapper_path.display()
        )
    })?;

    let directory = match PlacesConfig::from_env() {
        Some(config) => Some(
            GooglePlacesClient::new(config).context("failed to build places client")?,
        ),
        None => {
            warn!("GOOGLE_MAPS_API_KEY not set, nearby search is disabled");
            None
        }
    };

    let classifier = OpenAiClassifierConfig::from_env()
        .map(OpenAiIntentClassifier::new)
        .transpose()
        .context("failed to build intent classifier")?;

    info!(
        intents = catalog.len(),
        places_directory = directory.is_some(),
        intent_classifier = classifier.is_some(),
        "vibe agent ready"
    );

    Ok(VibeAgent::new(Arc::new(catalog), directory, classifier, metrics))
}

pub fn mapper_path_from_env() -> String {
    env::var("VIBES_MAPPER_PATH").unwrap_or_else(|_| DEFAULT_MAPPER_PATH.to_string())
}
