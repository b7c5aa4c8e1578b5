//! Music and playback intents
//!
//! The handlers that feed and drive the playback queue. Voice commands
//! (next, previous, stop) and the asynchronous "nearly finished" lifecycle
//! notification all converge on the queue engine owned by the API state;
//! the engine's lock decides their order when they race.

use crate::alexa::{Intent, ResponseEnvelope};
use crate::api::ApiState;
use crate::queue::Track;
use crate::Error;

use super::not_configured;

/// `PlayMusicIntent` — start a random playlist
pub async fn play_random(state: &ApiState) -> ResponseEnvelope {
    let Some(source) = &state.services.music else {
        return not_configured("music");
    };
    match source.random_playlist().await {
        Ok(tracks) => start_playback(state, tracks, "Playing music"),
        Err(e) => catalog_failure(&e),
    }
}

/// `SearchMusicIntent` — start a playlist filtered by the spoken query
pub async fn search(state: &ApiState, intent: &Intent) -> ResponseEnvelope {
    let Some(source) = &state.services.music else {
        return not_configured("music");
    };
    let Some(query) = intent.slot("music_query") else {
        return ResponseEnvelope::question("What would you like to listen to?");
    };
    match source.search_playlist(query).await {
        Ok(tracks) => start_playback(state, tracks, "Playing music"),
        Err(e) => catalog_failure(&e),
    }
}

/// `SearchPodcastIntent` — queue the episodes of a podcast
pub async fn podcast(state: &ApiState, intent: &Intent) -> ResponseEnvelope {
    let Some(source) = &state.services.music else {
        return not_configured("music");
    };
    let Some(query) = intent.slot("podcast_query") else {
        return ResponseEnvelope::question("Which podcast would you like?");
    };
    match source.podcast(query).await {
        Ok((name, tracks)) => {
            start_playback(state, tracks, format!("Playing podcast {name}"))
        }
        Err(e) => catalog_failure(&e),
    }
}

/// Hand a resolved playlist to the queue engine and answer with a Play
/// directive for its first track
fn start_playback(
    state: &ApiState,
    tracks: Vec<Track>,
    speech: impl Into<String>,
) -> ResponseEnvelope {
    match state.queue.start_queue(tracks) {
        Ok(uri) => {
            let speech = speech.into();
            ResponseEnvelope::statement(speech.clone())
                .with_card("Now playing", speech)
                .with_play(uri)
        }
        Err(Error::EmptyPlaylist) => {
            ResponseEnvelope::statement("I could not find anything to play.")
        }
        Err(e) => catalog_failure(&e),
    }
}

fn catalog_failure(error: &Error) -> ResponseEnvelope {
    tracing::error!(error = %error, "music catalog request failed");
    ResponseEnvelope::statement("Sorry, I could not reach the music catalog.")
}

/// `AMAZON.NextIntent` — skip forward
pub fn next_track(state: &ApiState) -> ResponseEnvelope {
    state.queue.next_item().map_or_else(
        || ResponseEnvelope::statement("All tracks have been played."),
        |uri| ResponseEnvelope::empty().with_play(uri),
    )
}

/// `AMAZON.PreviousIntent` — skip back
pub fn previous_track(state: &ApiState) -> ResponseEnvelope {
    state.queue.previous_item().map_or_else(
        || ResponseEnvelope::statement("There is no previous track."),
        |uri| ResponseEnvelope::empty().with_play(uri),
    )
}

/// `AMAZON.StartOverIntent` — replay the current track from the beginning
pub fn start_over(state: &ApiState) -> ResponseEnvelope {
    state.queue.current().map_or_else(
        || ResponseEnvelope::statement("Nothing is queued."),
        |uri| ResponseEnvelope::empty().with_play(uri),
    )
}

/// `AMAZON.PauseIntent` — stop the device without touching the queue
pub fn pause() -> ResponseEnvelope {
    ResponseEnvelope::empty().with_stop()
}

/// `AMAZON.ResumeIntent` — restart the current track
///
/// The gateway does not track playback offsets, so resume replays the
/// current track from the start.
pub fn resume(state: &ApiState) -> ResponseEnvelope {
    state.queue.current().map_or_else(
        || ResponseEnvelope::statement("Nothing is queued."),
        |uri| ResponseEnvelope::empty().with_play(uri),
    )
}

/// `AMAZON.StopIntent` — clear the queue and stop the device
pub fn stop(state: &ApiState) -> ResponseEnvelope {
    state.queue.clear();
    ResponseEnvelope::statement("Stopping music.").with_stop()
}

/// `AMAZON.CancelIntent` — clear both the queue and the device-side queue
pub fn cancel(state: &ApiState) -> ResponseEnvelope {
    state.queue.clear();
    ResponseEnvelope::empty().with_clear_queue().with_stop()
}

/// `AudioPlayer.PlaybackNearlyFinished` — the device wants the next stream
///
/// Called by the platform without user input. At the end of the queue the
/// engine holds its position and this answers with an empty response, which
/// lets playback finish naturally.
pub fn playback_nearly_finished(state: &ApiState) -> ResponseEnvelope {
    state.queue.next_item().map_or_else(
        ResponseEnvelope::empty,
        |uri| ResponseEnvelope::empty().with_play(uri),
    )
}
