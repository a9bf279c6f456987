use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const UNCLEAR_INTENT: &str = "unclear_intent";
pub const DEFAULT_RADIUS_M: u32 = 1500;
pub const MISSING_DISTANCE_M: u32 = 9999;
pub const MAX_CANDIDATES: usize = 6;
pub const MAX_RECOMMENDATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn as_query_value(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub place_id: String,
    pub name: String,
    /// Directory category the venue was found under.
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: u32,
    #[serde(default)]
    pub open_now: bool,
    #[serde(default)]
    pub vicinity: String,
    #[serde(default = "missing_distance")]
    pub distance_m: u32,
    #[serde(default)]
    pub geometry: Geometry,
}

fn missing_distance() -> u32 {
    MISSING_DISTANCE_M
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlace {
    #[serde(flatten)]
    pub place: PlaceCandidate,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentSource {
    Keyword,
    Classifier,
    Default,
}

impl IntentSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Classifier => "classifier",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIntent {
    pub intent: String,
    pub source: IntentSource,
}

impl ResolvedIntent {
    pub fn unclear() -> Self {
        Self {
            intent: UNCLEAR_INTENT.to_string(),
            source: IntentSource::Default,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VibeRequest {
    pub query: String,
    pub location: LatLng,
    #[serde(default)]
    pub radius_m: Option<u32>,
    #[serde(default)]
    pub scene_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VibeResponse {
    pub request_id: Uuid,
    pub intent: String,
    pub intent_source: IntentSource,
    pub candidates_considered: usize,
    pub recommendations: Vec<RankedPlace>,
    pub generated_at: DateTime<Utc>,
}
