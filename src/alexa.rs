//! Skill request/response envelopes
//!
//! A minimal model of the Alexa Skills Kit JSON protocol: incoming intent
//! requests and `AudioPlayer` lifecycle notifications, outgoing speech,
//! cards, and audio directives. Pure data — parsing and formatting only,
//! no dispatch logic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Incoming skill request envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    pub version: String,

    #[serde(default)]
    pub session: Option<Session>,

    #[serde(default)]
    pub context: Option<Context>,

    pub request: Request,
}

impl RequestEnvelope {
    /// Application id claimed by the request, wherever the platform put it
    ///
    /// Intent requests carry it in `session.application`; `AudioPlayer`
    /// notifications are sessionless and only carry `context.System`.
    #[must_use]
    pub fn application_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|s| s.application.application_id.as_str())
            .or_else(|| {
                self.context
                    .as_ref()
                    .and_then(|c| c.system.as_ref())
                    .map(|s| s.application.application_id.as_str())
            })
    }
}

/// Session block of an envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub application: Application,
    #[serde(default)]
    pub new: bool,
}

/// Skill application identity
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

/// Context block (present on sessionless `AudioPlayer` requests)
#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    #[serde(rename = "System")]
    pub system: Option<System>,
}

/// System context carrying the application identity
#[derive(Debug, Clone, Deserialize)]
pub struct System {
    pub application: Application,
}

/// The request body, discriminated by its `type` field
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Skill opened without an intent
    #[serde(rename = "LaunchRequest")]
    Launch,

    /// A recognized voice intent
    #[serde(rename = "IntentRequest", rename_all = "camelCase")]
    Intent { intent: Intent },

    /// The session ended (timeout, user exit, or error)
    #[serde(rename = "SessionEndedRequest")]
    SessionEnded,

    /// Device began playing a stream
    #[serde(rename = "AudioPlayer.PlaybackStarted")]
    PlaybackStarted,

    /// Device stopped playing
    #[serde(rename = "AudioPlayer.PlaybackStopped")]
    PlaybackStopped,

    /// Device failed to play a stream
    #[serde(rename = "AudioPlayer.PlaybackFailed")]
    PlaybackFailed,

    /// Device is about to finish the current stream and wants the next one
    #[serde(rename = "AudioPlayer.PlaybackNearlyFinished")]
    PlaybackNearlyFinished,

    /// Any request type this gateway does not model
    #[serde(other)]
    Unknown,
}

/// A recognized intent with its slot values
#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,

    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    /// Value of a slot, if the platform filled it with a non-empty string
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)
            .and_then(|s| s.value.as_deref())
            .filter(|v| !v.is_empty())
    }
}

/// A single slot of an intent
#[derive(Debug, Clone, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// Outgoing response envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: &'static str,
    pub response: ResponseBody,
}

/// Body of a skill response
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,

    pub should_end_session: bool,
}

/// Plain-text speech output
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    #[serde(rename = "PlainText")]
    PlainText { text: String },
}

/// Simple card shown in the companion app
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Card {
    #[serde(rename = "Simple")]
    Simple { title: String, content: String },
}

/// Reprompt wrapper for open-session questions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

/// `AudioPlayer` directives the gateway issues
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Directive {
    /// Start playing a stream, replacing whatever was queued on the device
    #[serde(rename = "AudioPlayer.Play", rename_all = "camelCase")]
    Play {
        play_behavior: &'static str,
        audio_item: AudioItem,
    },

    /// Stop playback
    #[serde(rename = "AudioPlayer.Stop")]
    Stop,

    /// Drop the device-side queue
    #[serde(rename = "AudioPlayer.ClearQueue", rename_all = "camelCase")]
    ClearQueue { clear_behavior: &'static str },
}

/// Stream wrapper of a Play directive
#[derive(Debug, Clone, Serialize)]
pub struct AudioItem {
    pub stream: Stream,
}

/// A playable stream
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub url: String,
    pub token: String,
    pub offset_in_milliseconds: u64,
}

impl ResponseEnvelope {
    fn new(body: ResponseBody) -> Self {
        Self {
            version: "1.0",
            response: body,
        }
    }

    /// A closing statement: speak and end the session
    #[must_use]
    pub fn statement(text: impl Into<String>) -> Self {
        Self::new(ResponseBody {
            output_speech: Some(OutputSpeech::PlainText { text: text.into() }),
            should_end_session: true,
            ..ResponseBody::default()
        })
    }

    /// An open question: speak, reprompt with the same text, keep listening
    #[must_use]
    pub fn question(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(ResponseBody {
            output_speech: Some(OutputSpeech::PlainText { text: text.clone() }),
            reprompt: Some(Reprompt {
                output_speech: OutputSpeech::PlainText { text },
            }),
            should_end_session: false,
            ..ResponseBody::default()
        })
    }

    /// An empty acknowledgement (lifecycle notifications expect these)
    #[must_use]
    pub fn empty() -> Self {
        Self::new(ResponseBody {
            should_end_session: true,
            ..ResponseBody::default()
        })
    }

    /// Attach a simple card
    #[must_use]
    pub fn with_card(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.response.card = Some(Card::Simple {
            title: title.into(),
            content: content.into(),
        });
        self
    }

    /// Attach a Play directive for a stream URL
    ///
    /// Each directive gets a fresh token; the device echoes it back in
    /// lifecycle notifications.
    #[must_use]
    pub fn with_play(mut self, url: impl Into<String>) -> Self {
        self.response.directives.push(Directive::Play {
            play_behavior: "REPLACE_ALL",
            audio_item: AudioItem {
                stream: Stream {
                    url: url.into(),
                    token: uuid::Uuid::new_v4().to_string(),
                    offset_in_milliseconds: 0,
                },
            },
        });
        self
    }

    /// Attach a Stop directive
    #[must_use]
    pub fn with_stop(mut self) -> Self {
        self.response.directives.push(Directive::Stop);
        self
    }

    /// Attach a ClearQueue directive
    #[must_use]
    pub fn with_clear_queue(mut self) -> Self {
        self.response.directives.push(Directive::ClearQueue {
            clear_behavior: "CLEAR_ALL",
        });
        self
    }
}
