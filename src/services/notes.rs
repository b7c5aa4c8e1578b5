//! Nextcloud Notes client
//!
//! The Notes app exposes a plain JSON REST API, much friendlier than the
//! DAV tree the calendar and tasks live in.

use serde::{Deserialize, Serialize};

use crate::config::NextcloudConfig;
use crate::{Error, Result};

/// A note as returned by the Notes API
#[derive(Debug, Clone, Deserialize)]
pub struct Note {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
struct CreateNoteRequest<'a> {
    content: &'a str,
}

/// Nextcloud Notes API client
pub struct NotesClient {
    base_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl NotesClient {
    /// Create a client for a Nextcloud instance
    #[must_use]
    pub fn new(config: &NextcloudConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self) -> String {
        format!("{}/index.php/apps/notes/api/v1/notes", self.base_url)
    }

    /// All notes, newest first as the server returns them
    ///
    /// # Errors
    ///
    /// Returns [`Error::Notes`] when the API call fails.
    pub async fn list(&self) -> Result<Vec<Note>> {
        let response = self
            .client
            .get(self.api_url())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Notes(format!(
                "notes listing failed with {}",
                response.status()
            )));
        }

        let notes: Vec<Note> = response.json().await?;
        tracing::debug!(count = notes.len(), "listed notes");
        Ok(notes)
    }

    /// The first note whose title contains `name` (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Notes`] when no note matches or the API call fails.
    pub async fn find_by_title(&self, name: &str) -> Result<Note> {
        let needle = name.to_lowercase();
        self.list()
            .await?
            .into_iter()
            .find(|n| n.title.to_lowercase().contains(&needle))
            .ok_or_else(|| Error::Notes(format!("no note matching '{name}'")))
    }

    /// Create a note from free-form content; the first line becomes its title
    ///
    /// # Errors
    ///
    /// Returns [`Error::Notes`] when the API call fails.
    pub async fn create(&self, content: &str) -> Result<Note> {
        let response = self
            .client
            .post(self.api_url())
            .basic_auth(&self.username, Some(&self.password))
            .json(&CreateNoteRequest { content })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Notes(format!(
                "note creation failed with {}",
                response.status()
            )));
        }

        let note: Note = response.json().await?;
        tracing::info!(id = note.id, title = %note.title, "created note");
        Ok(note)
    }
}
