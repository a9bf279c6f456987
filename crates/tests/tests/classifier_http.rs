use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;
use vibes_core::{IntentCatalog, IntentSource, UNCLEAR_INTENT};
use vibes_intent::{
    IntentClassifier, IntentExtractor, OpenAiClassifierConfig, OpenAiIntentClassifier,
};

fn catalog() -> Arc<IntentCatalog> {
    Arc::new(
        IntentCatalog::from_json_str(
            r#"{
                "quiet_study": { "keywords": ["study"], "types": ["library", "cafe"] },
                "nightlife": { "keywords": ["cocktail"], "types": ["bar", "night_club"] }
            }"#,
        )
        .unwrap(),
    )
}

fn classifier(server: &MockServer) -> OpenAiIntentClassifier {
    let mut config = OpenAiClassifierConfig::new("sk-test");
    config.base_url = server.base_url();
    config.timeout = Duration::from_secs(2);
    OpenAiIntentClassifier::new(config).unwrap()
}

#[tokio::test]
async fn sends_known_intents_as_strict_schema() {
    let server = MockServer::start_async().await;
    let responses = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/responses")
                .header("authorization", "Bearer sk-test")
                .json_body_partial(
                    r#"{
                        "model": "gpt-4o-mini",
                        "text": {
                            "format": {
                                "type": "json_schema",
                                "strict": true,
                                "schema": {
                                    "properties": {
                                        "intent": { "enum": ["quiet_study", "nightlife"] }
                                    }
                                }
                            }
                        }
                    }"#,
                );
            then.status(200)
                .json_body(json!({ "output_text": "{\"intent\":\"nightlife\"}" }));
        })
        .await;

    let label = classifier(&server)
        .classify("somewhere lively", &["quiet_study", "nightlife"])
        .await
        .unwrap();

    assert_eq!(label.as_deref(), Some("nightlife"));
    responses.assert_async().await;
}

#[tokio::test]
async fn extractor_uses_classifier_when_keywords_miss() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/responses");
            then.status(200).json_body(json!({
                "output": [{
                    "type": "message",
                    "content": [{ "type": "output_text", "text": "{\"intent\":\"quiet_study\"}" }]
                }]
            }));
        })
        .await;

    let extractor = IntentExtractor::new(catalog(), Some(classifier(&server)));
    let resolved = extractor.resolve("somewhere to hit the books").await;

    assert_eq!(resolved.intent, "quiet_study");
    assert_eq!(resolved.source, IntentSource::Classifier);
}

#[tokio::test]
async fn keyword_hit_never_calls_the_classifier() {
    let server = MockServer::start_async().await;
    let responses = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/responses");
            then.status(200)
                .json_body(json!({ "output_text": "{\"intent\":\"quiet_study\"}" }));
        })
        .await;

    let extractor = IntentExtractor::new(catalog(), Some(classifier(&server)));
    assert_eq!(extractor.extract_intent("COCKTAIL bar").await, "nightlife");
    responses.assert_hits_async(0).await;
}

#[tokio::test]
async fn unknown_label_falls_back_to_default() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/responses");
            then.status(200)
                .json_body(json!({ "output_text": "{\"intent\":\"skydiving\"}" }));
        })
        .await;

    let extractor = IntentExtractor::new(catalog(), Some(classifier(&server)));
    assert_eq!(extractor.extract_intent("jump out of a plane").await, UNCLEAR_INTENT);
}

#[tokio::test]
async fn service_errors_and_garbage_fall_back_to_default() {
    let failing = MockServer::start_async().await;
    failing
        .mock_async(|when, then| {
            when.method(POST).path("/v1/responses");
            then.status(429).body("rate limited");
        })
        .await;

    let garbage = MockServer::start_async().await;
    garbage
        .mock_async(|when, then| {
            when.method(POST).path("/v1/responses");
            then.status(200).json_body(json!({ "output_text": "not json at all" }));
        })
        .await;

    for server in [&failing, &garbage] {
        let extractor = IntentExtractor::new(catalog(), Some(classifier(server)));
        let resolved = extractor.resolve("anything at all").await;
        assert_eq!(resolved.intent, UNCLEAR_INTENT);
        assert_eq!(resolved.source, IntentSource::Default);
    }
}

#[tokio::test]
async fn status_errors_surface_from_the_classifier() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/responses");
            then.status(500).body("oops");
        })
        .await;

    let err = classifier(&server)
        .classify("anything", &["quiet_study"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("500"));
}
