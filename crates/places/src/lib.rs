mod accumulator;
mod google;
mod locator;

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vibes_core::{Geometry, LatLng};

pub use accumulator::CandidateAccumulator;
pub use google::{GooglePlacesClient, PlacesConfig};
pub use locator::{CandidateLocator, SearchPass};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("places request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("places directory returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Clone, Copy)]
pub struct NearbyQuery<'a> {
    pub location: LatLng,
    pub radius_m: u32,
    pub category: &'a str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearbySearchResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl NearbySearchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// One venue as the directory reports it. Every field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
}

pub trait PlacesDirectory: Send + Sync {
    fn nearby_search(
        &self,
        query: &NearbyQuery<'_>,
    ) -> impl Future<Output = Result<NearbySearchResponse, DirectoryError>> + Send;
}
