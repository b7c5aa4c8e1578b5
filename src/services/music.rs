//! Music catalog client (Track Source)
//!
//! Talks to the Subsonic-compatible endpoint of a Nextcloud Music app:
//! random playlists, free-text search, and podcast channels. Every result
//! is resolved down to a list of [`Track`]s with ready-to-stream URLs
//! before it ever reaches the queue engine.

use async_trait::async_trait;
use serde::Deserialize;

use super::TrackSource;
use crate::config::NextcloudConfig;
use crate::queue::Track;
use crate::{Error, Result};

/// Subsonic API version the client speaks
const API_VERSION: &str = "1.16.1";

/// Client identifier sent with every request
const CLIENT_NAME: &str = "perch";

/// Number of tracks in a random playlist
const RANDOM_PLAYLIST_SIZE: usize = 20;

/// Nextcloud Music (Subsonic API) client
pub struct MusicClient {
    base_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

/// Top-level Subsonic response wrapper
#[derive(Debug, Deserialize)]
struct SubsonicEnvelope {
    #[serde(rename = "subsonic-response")]
    response: SubsonicResponse,
}

#[derive(Debug, Deserialize)]
struct SubsonicResponse {
    status: String,
    error: Option<SubsonicError>,
    #[serde(rename = "randomSongs")]
    random_songs: Option<SongList>,
    #[serde(rename = "searchResult3")]
    search_result: Option<SongList>,
    podcasts: Option<PodcastList>,
}

#[derive(Debug, Deserialize)]
struct SubsonicError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SongList {
    #[serde(default)]
    song: Vec<Song>,
}

#[derive(Debug, Deserialize)]
struct Song {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct PodcastList {
    #[serde(default)]
    channel: Vec<PodcastChannel>,
}

#[derive(Debug, Deserialize)]
struct PodcastChannel {
    title: Option<String>,
    #[serde(default)]
    episode: Vec<PodcastEpisode>,
}

#[derive(Debug, Deserialize)]
struct PodcastEpisode {
    id: String,
    title: Option<String>,
    #[serde(rename = "streamId")]
    stream_id: Option<String>,
}

impl MusicClient {
    /// Create a client for a Nextcloud Music instance
    #[must_use]
    pub fn new(config: &NextcloudConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Issue a Subsonic REST call and unwrap the response envelope
    async fn call(&self, method: &str, extra: &[(&str, &str)]) -> Result<SubsonicResponse> {
        let url = format!("{}/apps/music/subsonic/rest/{method}", self.base_url);
        let mut query = vec![
            ("u", self.username.as_str()),
            ("p", self.password.as_str()),
            ("v", API_VERSION),
            ("c", CLIENT_NAME),
            ("f", "json"),
        ];
        query.extend_from_slice(extra);

        let envelope: SubsonicEnvelope = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let response = envelope.response;
        if response.status != "ok" {
            let detail = response
                .error
                .map_or_else(|| "unknown catalog failure".to_string(), |e| e.message);
            return Err(Error::Music(detail));
        }
        Ok(response)
    }

    /// Stream URL for a catalog song id
    fn stream_url(&self, id: &str) -> String {
        format!(
            "{}/apps/music/subsonic/rest/stream?u={}&p={}&v={}&c={}&id={}",
            self.base_url, self.username, self.password, API_VERSION, CLIENT_NAME, id
        )
    }

    fn songs_to_tracks(&self, songs: Vec<Song>) -> Vec<Track> {
        songs
            .into_iter()
            .map(|s| {
                let uri = self.stream_url(&s.id);
                Track::new(s.id, uri, s.title)
            })
            .collect()
    }
}

#[async_trait]
impl TrackSource for MusicClient {
    async fn random_playlist(&self) -> Result<Vec<Track>> {
        let size = RANDOM_PLAYLIST_SIZE.to_string();
        let response = self.call("getRandomSongs", &[("size", &size)]).await?;
        let songs = response.random_songs.map(|l| l.song).unwrap_or_default();
        tracing::debug!(count = songs.len(), "fetched random playlist");
        Ok(self.songs_to_tracks(songs))
    }

    async fn search_playlist(&self, query: &str) -> Result<Vec<Track>> {
        let response = self
            .call("search3", &[("query", query), ("songCount", "50")])
            .await?;
        let songs = response.search_result.map(|l| l.song).unwrap_or_default();
        tracing::debug!(query, count = songs.len(), "searched catalog");
        Ok(self.songs_to_tracks(songs))
    }

    async fn podcast(&self, query: &str) -> Result<(String, Vec<Track>)> {
        let response = self
            .call("getPodcasts", &[("includeEpisodes", "true")])
            .await?;
        let channels = response.podcasts.map(|p| p.channel).unwrap_or_default();

        let needle = query.to_lowercase();
        let channel = channels
            .into_iter()
            .find(|c| {
                c.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&needle))
            })
            .ok_or_else(|| Error::Music(format!("no podcast matching '{query}'")))?;

        let name = channel.title.unwrap_or_else(|| query.to_string());
        let tracks = channel
            .episode
            .into_iter()
            .map(|e| {
                let stream_id = e.stream_id.unwrap_or_else(|| e.id.clone());
                let uri = self.stream_url(&stream_id);
                let title = e.title.unwrap_or_else(|| "Untitled episode".to_string());
                Track::new(e.id, uri, title)
            })
            .collect();

        Ok((name, tracks))
    }
}
