//! Playback queue engine
//!
//! The one stateful subsystem of the gateway. Owns the ordered track list
//! and a cursor marking the currently playing track, and serializes every
//! read and mutation behind a single lock: voice intents and asynchronous
//! playback-lifecycle notifications (a device reporting "nearly finished")
//! race in real deployments, and both paths land here.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single playable audio resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog identifier
    pub id: String,

    /// Streamable URI handed to the playback device
    pub uri: String,

    /// Display title for cards and spoken responses
    pub title: String,
}

impl Track {
    /// Create a track from its parts
    #[must_use]
    pub fn new(id: impl Into<String>, uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            title: title.into(),
        }
    }
}

/// Queue contents guarded by the engine's lock
///
/// Invariant: `cursor` is `None` exactly when `tracks` is empty, and
/// `cursor < tracks.len()` whenever it is present.
#[derive(Debug, Default)]
struct QueueState {
    tracks: Vec<Track>,
    cursor: Option<usize>,
}

/// Serialized playback queue
///
/// One instance per playback session, owned by the API state and passed
/// into intent handlers. All operations take `&self` and linearize under
/// the internal mutex; none performs I/O while holding it, so callers may
/// invoke the engine from async context without blocking the runtime.
#[derive(Debug, Default)]
pub struct QueueEngine {
    state: Mutex<QueueState>,
}

impl QueueEngine {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with a new playlist and position at its first track
    ///
    /// Returns the URI of the first track. Any previously queued tracks are
    /// discarded unconditionally; starting a new search always starts fresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPlaylist`] when `tracks` is empty. The queue is
    /// left exactly as it was — there is no partial replacement.
    pub fn start_queue(&self, tracks: Vec<Track>) -> Result<String> {
        if tracks.is_empty() {
            return Err(Error::EmptyPlaylist);
        }

        let mut state = self.state.lock().unwrap();
        let uri = tracks[0].uri.clone();
        tracing::debug!(len = tracks.len(), first = %uri, "starting playback queue");
        state.tracks = tracks;
        state.cursor = Some(0);
        Ok(uri)
    }

    /// Advance to the next track and return its URI
    ///
    /// Returns `None` when the queue is empty or already at the last track.
    /// At the boundary the cursor holds its position rather than wrapping or
    /// invalidating, so `previous_item` still works from the true last index
    /// and repeated calls at the end stay `None`.
    #[must_use]
    pub fn next_item(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        let cursor = state.cursor?;
        if cursor + 1 >= state.tracks.len() {
            tracing::debug!(cursor, "queue exhausted, holding at last track");
            return None;
        }
        state.cursor = Some(cursor + 1);
        Some(state.tracks[cursor + 1].uri.clone())
    }

    /// Step back to the previous track and return its URI
    ///
    /// Returns `None` when the queue is empty or already at the first track;
    /// the cursor is left unchanged in both cases.
    #[must_use]
    pub fn previous_item(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        let cursor = state.cursor?;
        if cursor == 0 {
            return None;
        }
        state.cursor = Some(cursor - 1);
        Some(state.tracks[cursor - 1].uri.clone())
    }

    /// URI of the currently selected track, or `None` when the queue is empty
    #[must_use]
    pub fn current(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.cursor.map(|c| state.tracks[c].uri.clone())
    }

    /// Currently selected track, or `None` when the queue is empty
    #[must_use]
    pub fn current_track(&self) -> Option<Track> {
        let state = self.state.lock().unwrap();
        state.cursor.map(|c| state.tracks[c].clone())
    }

    /// Number of tracks in the queue
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().tracks.len()
    }

    /// Whether the queue holds no tracks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().tracks.is_empty()
    }

    /// Reset to the empty state, discarding all tracks
    ///
    /// Idempotent and infallible; this is the only cancellation primitive.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        if !state.tracks.is_empty() {
            tracing::debug!(len = state.tracks.len(), "clearing playback queue");
        }
        state.tracks.clear();
        state.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(uris: &[&str]) -> Vec<Track> {
        uris.iter()
            .enumerate()
            .map(|(i, uri)| Track::new(format!("t{i}"), *uri, format!("Track {i}")))
            .collect()
    }

    #[test]
    fn start_queue_rejects_empty_playlist() {
        let engine = QueueEngine::new();
        let err = engine.start_queue(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyPlaylist));
        assert_eq!(engine.current(), None);
    }

    #[test]
    fn failed_start_leaves_existing_queue_untouched() {
        let engine = QueueEngine::new();
        engine.start_queue(playlist(&["a", "b"])).unwrap();
        engine.next_item();

        assert!(engine.start_queue(Vec::new()).is_err());
        assert_eq!(engine.current(), Some("b".to_string()));
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn start_queue_positions_at_first_track() {
        let engine = QueueEngine::new();
        let first = engine.start_queue(playlist(&["a", "b", "c"])).unwrap();
        assert_eq!(first, "a");
        assert_eq!(engine.current(), Some("a".to_string()));
    }

    #[test]
    fn next_walks_forward_and_holds_at_last_track() {
        let engine = QueueEngine::new();
        engine.start_queue(playlist(&["a", "b", "c"])).unwrap();

        assert_eq!(engine.next_item(), Some("b".to_string()));
        assert_eq!(engine.next_item(), Some("c".to_string()));
        assert_eq!(engine.next_item(), None);
        // The terminal boundary is idempotent
        assert_eq!(engine.next_item(), None);
        assert_eq!(engine.current(), Some("c".to_string()));
    }

    #[test]
    fn previous_at_first_track_stays_put() {
        let engine = QueueEngine::new();
        engine.start_queue(playlist(&["a", "b"])).unwrap();

        assert_eq!(engine.previous_item(), None);
        assert_eq!(engine.current(), Some("a".to_string()));
    }

    #[test]
    fn previous_walks_back_from_the_end() {
        let engine = QueueEngine::new();
        engine.start_queue(playlist(&["a", "b", "c"])).unwrap();
        engine.next_item();
        engine.next_item();

        assert_eq!(engine.previous_item(), Some("b".to_string()));
        assert_eq!(engine.previous_item(), Some("a".to_string()));
        assert_eq!(engine.previous_item(), None);
    }

    #[test]
    fn navigation_on_empty_queue_is_none() {
        let engine = QueueEngine::new();
        assert_eq!(engine.next_item(), None);
        assert_eq!(engine.previous_item(), None);
        assert_eq!(engine.current(), None);
    }

    #[test]
    fn clear_resets_without_residue() {
        let engine = QueueEngine::new();
        engine.start_queue(playlist(&["a", "b", "c"])).unwrap();
        engine.next_item();

        engine.clear();
        assert_eq!(engine.current(), None);
        assert_eq!(engine.next_item(), None);
        assert!(engine.is_empty());

        // A fresh queue after clear starts at its own first track
        let first = engine.start_queue(playlist(&["d", "e"])).unwrap();
        assert_eq!(first, "d");
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn clear_is_idempotent() {
        let engine = QueueEngine::new();
        engine.clear();
        engine.clear();
        assert!(engine.is_empty());
    }

    #[test]
    fn restart_replaces_positioned_queue() {
        let engine = QueueEngine::new();
        engine.start_queue(playlist(&["a", "b", "c"])).unwrap();
        engine.next_item();

        let first = engine.start_queue(playlist(&["x", "y"])).unwrap();
        assert_eq!(first, "x");
        assert_eq!(engine.next_item(), Some("y".to_string()));
        assert_eq!(engine.next_item(), None);
    }

    #[test]
    fn current_track_exposes_title() {
        let engine = QueueEngine::new();
        engine
            .start_queue(vec![Track::new("1", "http://x/1.mp3", "First")])
            .unwrap();
        assert_eq!(engine.current_track().unwrap().title, "First");
    }
}
