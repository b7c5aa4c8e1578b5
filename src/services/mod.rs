//! External service collaborators
//!
//! Each client wraps one remote API behind a small struct owning a
//! `reqwest::Client`. The gateway consumes them as opaque producers of
//! either a text summary or an ordered list of playable tracks; none of
//! them holds gateway state.

mod calendar;
mod email;
mod ical;
mod music;
mod news;
mod notes;
mod tasks;
mod wol;

use std::sync::Arc;

use async_trait::async_trait;

pub use calendar::{CalendarClient, CalendarEvent};
pub use email::{EmailClient, EmailSummary};
pub use music::MusicClient;
pub use news::NewsClient;
pub use notes::{Note, NotesClient};
pub use tasks::{Task, TasksClient};
pub use wol::WolClient;

use crate::config::Config;
use crate::queue::Track;
use crate::Result;

/// Producer of ordered playable track sequences
///
/// The queue engine only ever receives fully resolved tracks; resolution
/// (search, filtering, podcast lookup) happens here, outside the engine's
/// lock. Implemented by [`MusicClient`] in production and by stubs in tests.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// A random playlist from the whole catalog
    async fn random_playlist(&self) -> Result<Vec<Track>>;

    /// Tracks matching a free-text query
    async fn search_playlist(&self, query: &str) -> Result<Vec<Track>>;

    /// Episodes of the podcast best matching a query, with its display name
    async fn podcast(&self, query: &str) -> Result<(String, Vec<Track>)>;
}

/// All configured collaborators, resolved once at startup
///
/// Unconfigured services are `None`; intent handlers degrade to a spoken
/// "not configured" response rather than failing the request.
pub struct Services {
    pub music: Option<Arc<dyn TrackSource>>,
    pub calendar: Option<CalendarClient>,
    pub notes: Option<NotesClient>,
    pub tasks: Option<TasksClient>,
    pub email: Option<EmailClient>,
    pub news: Option<NewsClient>,
    pub wol: Option<WolClient>,
}

impl Services {
    /// Build clients for every configured service
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let music = config
            .nextcloud
            .as_ref()
            .map(|nc| Arc::new(MusicClient::new(nc)) as Arc<dyn TrackSource>);

        Self {
            music,
            calendar: config.nextcloud.as_ref().map(CalendarClient::new),
            notes: config.nextcloud.as_ref().map(NotesClient::new),
            tasks: config.nextcloud.as_ref().map(TasksClient::new),
            email: config.email.as_ref().map(EmailClient::new),
            news: config.news.as_ref().map(NewsClient::new),
            wol: config.wake_on_lan.as_ref().map(WolClient::new),
        }
    }

    /// A service container with nothing configured (tests)
    #[must_use]
    pub fn disconnected() -> Self {
        Self {
            music: None,
            calendar: None,
            notes: None,
            tasks: None,
            email: None,
            news: None,
            wol: None,
        }
    }
}
