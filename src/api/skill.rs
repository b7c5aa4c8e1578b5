//! The skill endpoint
//!
//! One POST route receives every envelope the voice platform sends:
//! intent requests, launch/session bookkeeping, and `AudioPlayer`
//! lifecycle notifications. Verification failures are the only
//! non-200 responses; handler-level problems become spoken sentences
//! because the device cannot render an HTTP error.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::ApiState;
use crate::alexa::{RequestEnvelope, ResponseEnvelope};
use crate::intents;

/// Handle one skill request envelope
pub async fn handle_request(
    State(state): State<Arc<ApiState>>,
    Json(envelope): Json<RequestEnvelope>,
) -> Result<Json<ResponseEnvelope>, StatusCode> {
    if let Some(expected) = &state.application_id {
        let claimed = envelope.application_id();
        if claimed != Some(expected.as_str()) {
            tracing::warn!(?claimed, "rejecting request for wrong application id");
            return Err(StatusCode::FORBIDDEN);
        }
    }

    Ok(Json(intents::dispatch(&state, &envelope).await))
}
