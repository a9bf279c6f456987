use std::sync::Arc;

use tracing::{debug, warn};
use vibes_core::{
    distance_m, IntentCatalog, LatLng, PlaceCandidate, MAX_CANDIDATES, MISSING_DISTANCE_M,
};

use crate::{
    CandidateAccumulator, NearbyQuery, NearbySearchResponse, PlaceRecord, PlacesDirectory,
};

const PER_CATEGORY_PRIMARY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPass {
    /// First results of every category, for variety.
    Primary,
    /// Results past the primary window, only while capacity remains.
    Backfill,
}

impl SearchPass {
    pub const ALL: [SearchPass; 2] = [SearchPass::Primary, SearchPass::Backfill];

    fn skip(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Backfill => PER_CATEGORY_PRIMARY,
        }
    }

    fn take(self) -> usize {
        match self {
            Self::Primary => PER_CATEGORY_PRIMARY,
            Self::Backfill => usize::MAX,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Backfill => "backfill",
        }
    }
}

pub struct CandidateLocator<D> {
    catalog: Arc<IntentCatalog>,
    directory: Option<D>,
}

impl<D: PlacesDirectory> CandidateLocator<D> {
    /// `directory` is `None` when no directory credential is configured.
    pub fn new(catalog: Arc<IntentCatalog>, directory: Option<D>) -> Self {
        Self { catalog, directory }
    }

    pub fn has_directory(&self) -> bool {
        self.directory.is_some()
    }

    /// Up to six distinct nearby venues for `intent`. Per-category failures are
    /// logged and skipped. Backfill runs and stops on the number of results
    /// collected, duplicates included.
    pub async fn search_nearby(
        &self,
        intent: &str,
        origin: LatLng,
        radius_m: u32,
    ) -> Vec<PlaceCandidate> {
        let Some(directory) = self.directory.as_ref() else {
            warn!("places directory credential missing, returning no candidates");
            return Vec::new();
        };

        let Some(definition) = self.catalog.get(intent) else {
            debug!(intent, "intent has no place categories");
            return Vec::new();
        };

        let mut accumulator = CandidateAccumulator::new(MAX_CANDIDATES);

        for pass in SearchPass::ALL {
            if pass == SearchPass::Backfill && accumulator.is_full() {
                break;
            }

            for category in &definition.categories {
                if pass == SearchPass::Backfill && accumulator.is_full() {
                    break;
                }

                let query = NearbyQuery {
                    location: origin,
                    radius_m,
                    category,
                };
                let Some(response) = fetch(directory, &query, pass).await else {
                    continue;
                };

                for record in response
                    .results
                    .into_iter()
                    .skip(pass.skip())
                    .take(pass.take())
                {
                    if pass == SearchPass::Backfill && accumulator.is_full() {
                        break;
                    }
                    accumulator.offer(candidate_from_record(record, category, origin));
                }
            }
        }

        debug!(
            intent,
            collected = accumulator.collected(),
            candidates = accumulator.len(),
            "nearby search finished"
        );
        accumulator.into_vec()
    }
}

async fn fetch<D: PlacesDirectory>(
    directory: &D,
    query: &NearbyQuery<'_>,
    pass: SearchPass,
) -> Option<NearbySearchResponse> {
    match directory.nearby_search(query).await {
        Ok(response) if response.is_ok() => Some(response),
        Ok(response) => {
            warn!(
                category = query.category,
                pass = pass.as_str(),
                status = %response.status,
                "places directory returned non-OK status"
            );
            None
        }
        Err(err) => {
            warn!(
                category = query.category,
                pass = pass.as_str(),
                error = %err,
                "places directory request failed"
            );
            None
        }
    }
}

fn candidate_from_record(record: PlaceRecord, category: &str, origin: LatLng) -> PlaceCandidate {
    let distance = record
        .geometry
        .location
        .map(|location| distance_m(origin, location))
        .unwrap_or(MISSING_DISTANCE_M);

    PlaceCandidate {
        place_id: record.place_id.unwrap_or_default(),
        name: record.name.unwrap_or_else(|| "Unknown".to_string()),
        category: category.to_string(),
        rating: record.rating,
        user_ratings_total: record.user_ratings_total.unwrap_or(0),
        open_now: record
            .opening_hours
            .and_then(|hours| hours.open_now)
            .unwrap_or(false),
        vicinity: record.vicinity.unwrap_or_default(),
        distance_m: distance,
        geometry: record.geometry,
    }
}
