use std::path::Path;

use anyhow::Result;
use axum::extract::{Json, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use vibes_agents::{build_agent_from_env, AgentCapabilities, DefaultVibeAgent};
use vibes_core::{
    IntentSource, LatLng, PlaceCandidate, RankedPlace, VibeRequest, DEFAULT_RADIUS_M,
};
use vibes_observability::{AppMetrics, MetricsSnapshot};

const MAX_QUERY_LEN: usize = 500;
const MAX_RADIUS_M: u32 = 50_000;
const MAX_SCENE_TAGS: usize = 16;
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pub agent: DefaultVibeAgent,
}

#[derive(Debug, Deserialize)]
struct IntentRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct IntentResponse {
    intent: String,
    source: IntentSource,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    intent: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    radius_m: Option<u32>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    intent: String,
    candidates: Vec<PlaceCandidate>,
}

#[derive(Debug, Deserialize)]
struct RankRequest {
    candidates: Vec<PlaceCandidate>,
    intent: String,
    #[serde(default)]
    scene_tags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RankResponse {
    recommendations: Vec<RankedPlace>,
}

#[derive(Debug, Deserialize)]
struct RecommendRequest {
    query: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    radius_m: Option<u32>,
    #[serde(default)]
    scene_tags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    intents: usize,
    capabilities: AgentCapabilities,
    metrics: MetricsSnapshot,
}

/// Router backed by an agent built from the environment.
pub fn build_app(mapper_path: impl AsRef<Path>) -> Result<Router> {
    let agent = build_agent_from_env(mapper_path, AppMetrics::shared())?;
    Ok(build_router(agent))
}

pub fn build_router(agent: DefaultVibeAgent) -> Router {
    let state = ApiState { agent };

    Router::new()
        .route("/health", get(health))
        .route("/v1/intent", post(intent))
        .route("/v1/search", post(search))
        .route("/v1/rank", post(rank))
        .route("/v1/recommend", post(recommend))
        .route("/v1/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        intents: state.agent.catalog().len(),
        capabilities: state.agent.capabilities(),
        metrics: state.agent.metrics().snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.agent.metrics().snapshot())
}

async fn intent(State(state): State<ApiState>, Json(request): Json<IntentRequest>) -> Response {
    if let Err(response) = validate_query(&request.query) {
        return response;
    }

    let resolved = state.agent.resolve_intent(&request.query).await;
    Json(IntentResponse {
        intent: resolved.intent,
        source: resolved.source,
    })
    .into_response()
}

async fn search(State(state): State<ApiState>, Json(request): Json<SearchRequest>) -> Response {
    let location = match validate_location(request.lat, request.lng) {
        Ok(location) => location,
        Err(response) => return response,
    };
    let radius_m = match validate_radius(request.radius_m) {
        Ok(radius_m) => radius_m,
        Err(response) => return response,
    };

    let candidates = state
        .agent
        .search(&request.intent, location, radius_m)
        .await;
    Json(SearchResponse {
        intent: request.intent,
        candidates,
    })
    .into_response()
}

async fn rank(State(state): State<ApiState>, Json(request): Json<RankRequest>) -> Response {
    if let Err(response) = validate_scene_tags(&request.scene_tags) {
        return response;
    }

    let recommendations = state
        .agent
        .rank(request.candidates, &request.intent, &request.scene_tags);
    Json(RankResponse { recommendations }).into_response()
}

async fn recommend(
    State(state): State<ApiState>,
    Json(request): Json<RecommendRequest>,
) -> Response {
    if let Err(response) = validate_query(&request.query) {
        return response;
    }
    if let Err(response) = validate_scene_tags(&request.scene_tags) {
        return response;
    }
    let location = match validate_location(request.lat, request.lng) {
        Ok(location) => location,
        Err(response) => return response,
    };
    let radius_m = match validate_radius(request.radius_m) {
        Ok(radius_m) => radius_m,
        Err(response) => return response,
    };

    let response = state
        .agent
        .recommend(VibeRequest {
            query: request.query,
            location,
            radius_m: Some(radius_m),
            scene_tags: request.scene_tags,
        })
        .await;
    Json(response).into_response()
}

fn validate_query(query: &str) -> Result<(), Response> {
    if query.trim().is_empty() {
        return Err(bad_request("invalid_query", "query must not be empty"));
    }
    if query.chars().count() > MAX_QUERY_LEN {
        return Err(bad_request(
            "invalid_query",
            &format!("query must be at most {MAX_QUERY_LEN} characters"),
        ));
    }
    Ok(())
}

fn validate_location(lat: f64, lng: f64) -> Result<LatLng, Response> {
    let location = LatLng::new(lat, lng);
    if !location.is_valid() {
        return Err(bad_request(
            "invalid_location",
            "lat must be within [-90, 90] and lng within [-180, 180]",
        ));
    }
    Ok(location)
}

fn validate_radius(radius_m: Option<u32>) -> Result<u32, Response> {
    let radius_m = radius_m.unwrap_or(DEFAULT_RADIUS_M);
    if radius_m == 0 || radius_m > MAX_RADIUS_M {
        return Err(bad_request(
            "invalid_radius",
            &format!("radius_m must be within 1..={MAX_RADIUS_M}"),
        ));
    }
    Ok(radius_m)
}

fn validate_scene_tags(scene_tags: &[String]) -> Result<(), Response> {
    if scene_tags.len() > MAX_SCENE_TAGS {
        return Err(bad_request(
            "invalid_scene_tags",
            &format!("at most {MAX_SCENE_TAGS} scene tags are accepted"),
        ));
    }
    Ok(())
}

fn bad_request(code: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}
