//! Skill endpoint integration tests

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use perch_gateway::api::ApiState;
use perch_gateway::services::Services;
use perch_gateway::QueueEngine;

mod common;
use common::{
    intent_envelope, intent_envelope_with_slot, lifecycle_envelope, skill_router,
    state_with_tracks, FixedTrackSource,
};

/// POST one envelope to the skill route and return the decoded response
async fn post_envelope(app: Router, envelope: &serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(envelope).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn speech(json: &serde_json::Value) -> &str {
    json["response"]["outputSpeech"]["text"].as_str().unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = skill_router(state_with_tracks(&[]))
        .merge(perch_gateway::api::health::router());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn search_music_answers_with_play_directive_for_first_track() {
    let state = state_with_tracks(&["http://m/1.mp3", "http://m/2.mp3", "http://m/3.mp3"]);
    let app = skill_router(state.clone());

    let envelope = intent_envelope_with_slot("SearchMusicIntent", "music_query", "bossa nova");
    let (status, json) = post_envelope(app, &envelope).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(speech(&json), "Playing music");
    assert_eq!(json["response"]["card"]["type"], "Simple");

    let directive = &json["response"]["directives"][0];
    assert_eq!(directive["type"], "AudioPlayer.Play");
    assert_eq!(directive["playBehavior"], "REPLACE_ALL");
    assert_eq!(directive["audioItem"]["stream"]["url"], "http://m/1.mp3");

    assert_eq!(state.queue.current(), Some("http://m/1.mp3".to_string()));
}

#[tokio::test]
async fn nearly_finished_notification_advances_the_same_queue() {
    let state = state_with_tracks(&["http://m/1.mp3", "http://m/2.mp3"]);
    let app = skill_router(state.clone());

    let start = intent_envelope_with_slot("SearchMusicIntent", "music_query", "jazz");
    post_envelope(app.clone(), &start).await;

    let (status, json) =
        post_envelope(app.clone(), &lifecycle_envelope("AudioPlayer.PlaybackNearlyFinished")).await;
    assert_eq!(status, StatusCode::OK);
    let directive = &json["response"]["directives"][0];
    assert_eq!(directive["audioItem"]["stream"]["url"], "http://m/2.mp3");

    // At the end of the queue the notification gets an empty answer and
    // playback is left to finish on its own
    let (_, json) =
        post_envelope(app, &lifecycle_envelope("AudioPlayer.PlaybackNearlyFinished")).await;
    assert!(json["response"].get("directives").is_none());
    assert_eq!(state.queue.current(), Some("http://m/2.mp3".to_string()));
}

#[tokio::test]
async fn next_intent_past_the_end_says_so() {
    let state = state_with_tracks(&["http://m/only.mp3"]);
    let app = skill_router(state);

    post_envelope(app.clone(), &intent_envelope("PlayMusicIntent")).await;

    let (_, json) = post_envelope(app, &intent_envelope("AMAZON.NextIntent")).await;
    assert_eq!(speech(&json), "All tracks have been played.");
}

#[tokio::test]
async fn previous_intent_pins_at_the_first_track() {
    let state = state_with_tracks(&["http://m/1.mp3", "http://m/2.mp3"]);
    let app = skill_router(state.clone());

    post_envelope(app.clone(), &intent_envelope("PlayMusicIntent")).await;

    let (_, json) = post_envelope(app, &intent_envelope("AMAZON.PreviousIntent")).await;
    assert_eq!(speech(&json), "There is no previous track.");
    assert_eq!(state.queue.current(), Some("http://m/1.mp3".to_string()));
}

#[tokio::test]
async fn stop_intent_clears_the_queue() {
    let state = state_with_tracks(&["http://m/1.mp3", "http://m/2.mp3"]);
    let app = skill_router(state.clone());

    post_envelope(app.clone(), &intent_envelope("PlayMusicIntent")).await;
    assert!(!state.queue.is_empty());

    let (_, json) = post_envelope(app, &intent_envelope("AMAZON.StopIntent")).await;
    assert_eq!(speech(&json), "Stopping music.");
    assert_eq!(json["response"]["directives"][0]["type"], "AudioPlayer.Stop");
    assert!(state.queue.is_empty());
}

#[tokio::test]
async fn empty_catalog_result_is_a_spoken_apology() {
    let mut services = Services::disconnected();
    services.music = Some(Arc::new(FixedTrackSource::empty()));
    let state = Arc::new(ApiState {
        queue: QueueEngine::new(),
        services,
        application_id: None,
    });
    let app = skill_router(state.clone());

    let envelope = intent_envelope_with_slot("SearchMusicIntent", "music_query", "nothing");
    let (status, json) = post_envelope(app, &envelope).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(speech(&json), "I could not find anything to play.");
    assert!(state.queue.is_empty());
}

#[tokio::test]
async fn missing_search_slot_asks_a_question() {
    let app = skill_router(state_with_tracks(&["http://m/1.mp3"]));

    let (_, json) = post_envelope(app, &intent_envelope("SearchMusicIntent")).await;
    assert_eq!(json["response"]["shouldEndSession"], false);
    assert_eq!(speech(&json), "What would you like to listen to?");
}

#[tokio::test]
async fn launch_request_opens_a_session() {
    let app = skill_router(state_with_tracks(&[]));

    let envelope = serde_json::json!({
        "version": "1.0",
        "session": {
            "sessionId": "s-launch",
            "application": {"applicationId": "amzn1.ask.skill.test"},
            "new": true
        },
        "request": {"type": "LaunchRequest", "requestId": "r-launch"}
    });
    let (status, json) = post_envelope(app, &envelope).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["response"]["shouldEndSession"], false);
    assert!(json["response"]["reprompt"].is_object());
}

#[tokio::test]
async fn wrong_application_id_is_forbidden() {
    let state = Arc::new(ApiState {
        queue: QueueEngine::new(),
        services: Services::disconnected(),
        application_id: Some("amzn1.ask.skill.expected".to_string()),
    });
    let app = skill_router(state);

    // Envelopes from common claim amzn1.ask.skill.test
    let (status, _) = post_envelope(app.clone(), &intent_envelope("PlayMusicIntent")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        post_envelope(app, &lifecycle_envelope("AudioPlayer.PlaybackNearlyFinished")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn matching_application_id_is_accepted() {
    let state = Arc::new(ApiState {
        queue: QueueEngine::new(),
        services: Services::disconnected(),
        application_id: Some("amzn1.ask.skill.test".to_string()),
    });
    let app = skill_router(state);

    let (status, _) = post_envelope(app, &intent_envelope("AMAZON.HelpIntent")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unconfigured_music_service_is_reported() {
    let state = Arc::new(ApiState {
        queue: QueueEngine::new(),
        services: Services::disconnected(),
        application_id: None,
    });
    let app = skill_router(state);

    let (_, json) = post_envelope(app, &intent_envelope("PlayMusicIntent")).await;
    assert_eq!(speech(&json), "The music service is not set up yet.");
}

#[tokio::test]
async fn unknown_intent_gets_a_fallback_sentence() {
    let app = skill_router(state_with_tracks(&[]));

    let (_, json) = post_envelope(app, &intent_envelope("SomeFutureIntent")).await;
    assert_eq!(
        speech(&json),
        "That action is not supported yet. Please try again."
    );
}
