use std::collections::HashSet;
use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;
use vibes_core::{IntentCatalog, LatLng, MISSING_DISTANCE_M};
use vibes_places::{CandidateLocator, GooglePlacesClient, PlacesConfig};

const NEARBY_PATH: &str = "/maps/api/place/nearbysearch/json";

fn catalog() -> Arc<IntentCatalog> {
    Arc::new(
        IntentCatalog::from_json_str(
            r#"{
                "quiet_study": { "keywords": ["study"], "types": ["library", "cafe"] }
            }"#,
        )
        .unwrap(),
    )
}

fn client(server: &MockServer) -> GooglePlacesClient {
    let mut config = PlacesConfig::new("test-key");
    config.base_url = server.base_url();
    GooglePlacesClient::new(config).unwrap()
}

fn place(id: &str, lat: f64, lng: f64) -> serde_json::Value {
    json!({
        "name": format!("Venue {id}"),
        "place_id": id,
        "rating": 4.6,
        "user_ratings_total": 87,
        "opening_hours": { "open_now": true },
        "vicinity": "1 Main St",
        "geometry": { "location": { "lat": lat, "lng": lng } }
    })
}

#[tokio::test]
async fn sends_directory_parameters_and_maps_results() {
    let server = MockServer::start_async().await;
    let library = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(NEARBY_PATH)
                .query_param("key", "test-key")
                .query_param("location", "37.7749,-122.4194")
                .query_param("radius", "1500")
                .query_param("type", "library")
                .query_param("opennow", "true");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": [
                    place("lib-1", 37.7849, -122.4094),
                    { "place_id": "lib-2", "name": "No Geometry Library" }
                ]
            }));
        })
        .await;
    let cafe = server
        .mock_async(|when, then| {
            when.method(GET).path(NEARBY_PATH).query_param("type", "cafe");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": [place("cafe-1", 37.7750, -122.4194)]
            }));
        })
        .await;

    let locator = CandidateLocator::new(catalog(), Some(client(&server)));
    let found = locator
        .search_nearby("quiet_study", LatLng::new(37.7749, -122.4194), 1500)
        .await;

    assert_eq!(found.len(), 3);
    assert_eq!(found[0].place_id, "lib-1");
    assert_eq!(found[0].category, "library");
    assert_eq!(found[0].distance_m, 1417);
    assert_eq!(found[0].rating, Some(4.6));
    assert!(found[0].open_now);

    assert_eq!(found[1].place_id, "lib-2");
    assert_eq!(found[1].distance_m, MISSING_DISTANCE_M);
    assert!(!found[1].open_now);

    assert_eq!(found[2].place_id, "cafe-1");
    assert_eq!(found[2].category, "cafe");

    // Fewer than six after the primary pass, so each category is asked twice.
    library.assert_hits_async(2).await;
    cafe.assert_hits_async(2).await;
}

#[tokio::test]
async fn never_exceeds_six_unique_candidates() {
    let server = MockServer::start_async().await;
    for category in ["library", "cafe"] {
        let results = (0..8)
            .map(|idx| place(&format!("{category}-{idx}"), 37.78, -122.41))
            .collect::<Vec<_>>();
        server
            .mock_async(|when, then| {
                when.method(GET).path(NEARBY_PATH).query_param("type", category);
                then.status(200)
                    .json_body(json!({ "status": "OK", "results": results }));
            })
            .await;
    }

    let locator = CandidateLocator::new(catalog(), Some(client(&server)));
    let found = locator
        .search_nearby("quiet_study", LatLng::new(37.7749, -122.4194), 1500)
        .await;

    assert_eq!(found.len(), 6);
    let unique = found.iter().map(|c| c.place_id.as_str()).collect::<HashSet<_>>();
    assert_eq!(unique.len(), 6);
}

#[tokio::test]
async fn shared_results_across_categories_skip_the_backfill() {
    let server = MockServer::start_async().await;
    let library = server
        .mock_async(|when, then| {
            when.method(GET).path(NEARBY_PATH).query_param("type", "library");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": (["a", "b", "c", "d", "e"]
                    .iter()
                    .map(|id| place(id, 37.78, -122.41))
                    .collect::<Vec<_>>())
            }));
        })
        .await;
    let cafe = server
        .mock_async(|when, then| {
            when.method(GET).path(NEARBY_PATH).query_param("type", "cafe");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": (["a", "b", "c", "x", "y"]
                    .iter()
                    .map(|id| place(id, 37.78, -122.41))
                    .collect::<Vec<_>>())
            }));
        })
        .await;

    let locator = CandidateLocator::new(catalog(), Some(client(&server)));
    let found = locator
        .search_nearby("quiet_study", LatLng::new(37.7749, -122.4194), 1500)
        .await;

    let ids = found.iter().map(|c| c.place_id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(found[0].category, "library");
    library.assert_hits_async(1).await;
    cafe.assert_hits_async(1).await;
}

#[tokio::test]
async fn failing_and_denied_categories_are_skipped() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(NEARBY_PATH).query_param("type", "library");
            then.status(500).body("upstream exploded");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(NEARBY_PATH).query_param("type", "cafe");
            then.status(200).json_body(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "results": []
            }));
        })
        .await;

    let locator = CandidateLocator::new(catalog(), Some(client(&server)));
    let found = locator
        .search_nearby("quiet_study", LatLng::new(37.7749, -122.4194), 1500)
        .await;

    assert!(found.is_empty());
}

#[tokio::test]
async fn malformed_body_skips_only_that_category() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(NEARBY_PATH).query_param("type", "library");
            then.status(200).body("<html>not json</html>");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(NEARBY_PATH).query_param("type", "cafe");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": [place("cafe-1", 37.7750, -122.4194)]
            }));
        })
        .await;

    let locator = CandidateLocator::new(catalog(), Some(client(&server)));
    let found = locator
        .search_nearby("quiet_study", LatLng::new(37.7749, -122.4194), 1500)
        .await;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].place_id, "cafe-1");
}

#[tokio::test]
async fn unknown_intent_makes_no_requests() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.method(GET).path(NEARBY_PATH);
            then.status(200).json_body(json!({ "status": "OK", "results": [] }));
        })
        .await;

    let locator = CandidateLocator::new(catalog(), Some(client(&server)));
    let found = locator
        .search_nearby("skydiving", LatLng::new(0.0, 0.0), 1500)
        .await;

    assert!(found.is_empty());
    any.assert_hits_async(0).await;
}
