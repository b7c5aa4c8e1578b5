//! Error types for the Perch gateway

use thiserror::Error;

/// Result type alias for Perch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Perch gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A playback queue was started with zero tracks
    ///
    /// This is the only error the queue engine produces; navigation past
    /// the ends of the queue is an ordinary `None`, not an error.
    #[error("cannot start playback queue from an empty playlist")]
    EmptyPlaylist,

    /// Music catalog error
    #[error("music catalog error: {0}")]
    Music(String),

    /// Calendar service error
    #[error("calendar error: {0}")]
    Calendar(String),

    /// Notes service error
    #[error("notes error: {0}")]
    Notes(String),

    /// Tasks service error
    #[error("tasks error: {0}")]
    Tasks(String),

    /// Email (IMAP) error
    #[error("email error: {0}")]
    Email(String),

    /// News feed error
    #[error("news error: {0}")]
    News(String),

    /// Wake-on-lan / sleep-on-lan error
    #[error("wake-on-lan error: {0}")]
    WakeOnLan(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
