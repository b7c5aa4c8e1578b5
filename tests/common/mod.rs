//! Shared test utilities

use std::sync::Arc;

use async_trait::async_trait;
use axum::routing::post;
use axum::Router;

use perch_gateway::api::{skill, ApiState};
use perch_gateway::services::{Services, TrackSource};
use perch_gateway::{Error, QueueEngine, Result, Track};

/// Track source serving a fixed playlist, as a search backend would
pub struct FixedTrackSource {
    tracks: Vec<Track>,
}

impl FixedTrackSource {
    pub fn new(uris: &[&str]) -> Self {
        let tracks = uris
            .iter()
            .enumerate()
            .map(|(i, uri)| Track::new(format!("t{i}"), *uri, format!("Track {i}")))
            .collect();
        Self { tracks }
    }

    pub fn empty() -> Self {
        Self { tracks: Vec::new() }
    }
}

#[async_trait]
impl TrackSource for FixedTrackSource {
    async fn random_playlist(&self) -> Result<Vec<Track>> {
        Ok(self.tracks.clone())
    }

    async fn search_playlist(&self, _query: &str) -> Result<Vec<Track>> {
        Ok(self.tracks.clone())
    }

    async fn podcast(&self, query: &str) -> Result<(String, Vec<Track>)> {
        if self.tracks.is_empty() {
            return Err(Error::Music(format!("no podcast matching '{query}'")));
        }
        Ok((query.to_string(), self.tracks.clone()))
    }
}

/// API state wired to a fixed track source and no other services
pub fn state_with_tracks(uris: &[&str]) -> Arc<ApiState> {
    let mut services = Services::disconnected();
    services.music = Some(Arc::new(FixedTrackSource::new(uris)));
    Arc::new(ApiState {
        queue: QueueEngine::new(),
        services,
        application_id: None,
    })
}

/// Build the skill router around a prepared state
pub fn skill_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", post(skill::handle_request))
        .with_state(state)
}

/// An intent request envelope with no slots
pub fn intent_envelope(name: &str) -> serde_json::Value {
    serde_json::json!({
        "version": "1.0",
        "session": {
            "sessionId": "s-test",
            "application": {"applicationId": "amzn1.ask.skill.test"},
            "new": false
        },
        "request": {
            "type": "IntentRequest",
            "requestId": "r-test",
            "intent": {"name": name, "slots": {}}
        }
    })
}

/// An intent request envelope with one filled slot
pub fn intent_envelope_with_slot(name: &str, slot: &str, value: &str) -> serde_json::Value {
    let mut envelope = intent_envelope(name);
    envelope["request"]["intent"]["slots"] = serde_json::json!({
        slot: {"name": slot, "value": value}
    });
    envelope
}

/// A sessionless lifecycle notification envelope
pub fn lifecycle_envelope(request_type: &str) -> serde_json::Value {
    serde_json::json!({
        "version": "1.0",
        "context": {
            "System": {"application": {"applicationId": "amzn1.ask.skill.test"}}
        },
        "request": {"type": request_type, "requestId": "r-lifecycle", "token": "tok"}
    })
}
