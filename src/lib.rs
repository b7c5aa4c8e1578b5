//! Perch Gateway - voice assistant backend
//!
//! Translates recognized smart-speaker intents into calls against personal
//! productivity services and a music/podcast catalog, returning spoken
//! responses and audio-playback directives.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Voice platform                       │
//! │   intents  │  AudioPlayer lifecycle notifications   │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST /  (skill envelopes)
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Perch Gateway                        │
//! │   Intent Router  │  Queue Engine  │  Service clients│
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │   Nextcloud (calendar/notes/tasks/music)  │  IMAP   │
//! │   news feed  │  wake-on-lan target                  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The queue engine is the only stateful component: it owns the ordered
//! track list for the current playback session and serializes voice
//! commands against asynchronous device notifications.

pub mod alexa;
pub mod api;
pub mod config;
pub mod error;
pub mod intents;
pub mod queue;
pub mod services;

pub use config::Config;
pub use error::{Error, Result};
pub use queue::{QueueEngine, Track};
