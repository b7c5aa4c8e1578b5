//! Intent routing
//!
//! Maps each recognized intent name to exactly one handler and turns the
//! handler's outcome into a response envelope. Handlers never touch the
//! wire themselves; they call the queue engine or a service client and
//! format a sentence.

pub mod music;
pub mod productivity;

use crate::alexa::{Intent, Request, RequestEnvelope, ResponseEnvelope};
use crate::api::ApiState;

/// Dispatch one request envelope to its handler
pub async fn dispatch(state: &ApiState, envelope: &RequestEnvelope) -> ResponseEnvelope {
    match &envelope.request {
        Request::Launch => {
            ResponseEnvelope::question("Hi, I'm Perch. What can I do for you?")
                .with_card("Perch", "Hi, I'm Perch. What can I do for you?")
        }
        Request::SessionEnded => ResponseEnvelope::empty(),
        Request::Intent { intent } => dispatch_intent(state, intent).await,

        // Playback lifecycle notifications from the device. Only
        // "nearly finished" drives the queue; the rest are acknowledged.
        Request::PlaybackStarted | Request::PlaybackStopped => ResponseEnvelope::empty(),
        Request::PlaybackFailed => {
            tracing::warn!("device reported playback failure");
            ResponseEnvelope::empty()
        }
        Request::PlaybackNearlyFinished => music::playback_nearly_finished(state),

        Request::Unknown => {
            tracing::debug!("ignoring unmodeled request type");
            ResponseEnvelope::empty()
        }
    }
}

async fn dispatch_intent(state: &ApiState, intent: &Intent) -> ResponseEnvelope {
    tracing::info!(intent = %intent.name, "dispatching intent");

    match intent.name.as_str() {
        // Playback queue
        "PlayMusicIntent" => music::play_random(state).await,
        "SearchMusicIntent" => music::search(state, intent).await,
        "SearchPodcastIntent" => music::podcast(state, intent).await,
        "AMAZON.NextIntent" => music::next_track(state),
        "AMAZON.PreviousIntent" => music::previous_track(state),
        "AMAZON.StartOverIntent" => music::start_over(state),
        "AMAZON.PauseIntent" => music::pause(),
        "AMAZON.ResumeIntent" => music::resume(state),
        "AMAZON.StopIntent" => music::stop(state),
        "AMAZON.CancelIntent" => music::cancel(state),

        // Productivity services
        "ListCalendarIntent" => productivity::list_calendar(state, intent).await,
        "CreateCalendarIntent" => productivity::create_calendar(state, intent).await,
        "ListTasksIntent" => productivity::list_tasks(state).await,
        "CreateTaskIntent" => productivity::create_task(state, intent).await,
        "FinishTaskIntent" => productivity::finish_task(state, intent).await,
        "ListNotesIntent" => productivity::list_notes(state).await,
        "ReadNoteIntent" => productivity::read_note(state, intent).await,
        "CreateNoteIntent" => productivity::create_note(state, intent).await,
        "ListEmailsIntent" => productivity::list_emails(state).await,
        "ReadEmailIntent" => productivity::read_email(state, intent).await,
        "ListNewsIntent" => productivity::list_news(state).await,
        "DailyDigestIntent" => productivity::daily_digest(state).await,
        "WakeOnLanIntent" => productivity::wake_machine(state).await,
        "SleepOnLanIntent" => productivity::sleep_machine(state).await,

        "AMAZON.HelpIntent" => ResponseEnvelope::question(
            "You can ask me to play music, list your calendar, read your notes, \
             or catch you up with a daily digest.",
        ),

        // Recognized but deliberately unsupported playback modes
        "AMAZON.FallbackIntent"
        | "AMAZON.LoopOffIntent"
        | "AMAZON.LoopOnIntent"
        | "AMAZON.RepeatIntent"
        | "AMAZON.ShuffleOffIntent"
        | "AMAZON.ShuffleOnIntent" => {
            ResponseEnvelope::statement("That command is not supported.")
        }

        other => {
            tracing::debug!(intent = other, "unknown intent");
            ResponseEnvelope::statement("That action is not supported yet. Please try again.")
        }
    }
}

/// Spoken fallback for a service that is not configured
pub(crate) fn not_configured(what: &str) -> ResponseEnvelope {
    ResponseEnvelope::statement(format!("The {what} service is not set up yet."))
}
