//! Event-bus protocol shared by all session components.
//!
//! This module defines the message payloads exchanged between the UI, the
//! session manager, and the engine adapter over the broadcast bus.

use crate::engine::PlayMode;

/// Top-level envelope for all bus traffic.
#[derive(Debug, Clone)]
pub enum Message {
    Session(SessionMessage),
    Engine(EngineNotification),
}

/// Album record attached to track metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
pub struct AlbumInfo {
    /// Album title.
    pub name: String,
}

/// Immutable description of one track in the session.
///
/// Equality of `id` is the sole dedup key; the remaining fields are display
/// metadata plus the source descriptor handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct TrackMetadata {
    /// Stable track id.
    pub id: String,
    /// Track title.
    pub name: String,
    /// Performing artists.
    pub artists: Vec<String>,
    /// Album record.
    pub album: AlbumInfo,
    /// Track duration in milliseconds.
    pub duration_ms: u64,
    /// Raw source descriptor resolved into a playable handle on demand.
    pub source: String,
}

/// Session-domain commands and notifications.
#[derive(Debug, Clone)]
pub enum SessionMessage {
    // Commands, typically issued by the UI.
    AddTrack(TrackMetadata),
    /// Add (or find) the track and start playing it.
    PlayTrack(TrackMetadata),
    /// Resume playback of the current track.
    Resume,
    PlayOrPause,
    PlayNext,
    PlayLast,
    RemoveTrack(String),
    /// Install a new track list wholesale (e.g. a restored playlist).
    ReplaceTracks(Vec<TrackMetadata>),
    SetPlayMode(PlayMode),

    // Notifications emitted by the session manager.
    TrackAdded {
        id: String,
        index: usize,
    },
    TrackRemoved {
        id: String,
        index: usize,
    },
    TracksReplaced {
        count: usize,
    },
    /// The engine moved to a new index; carries the matching metadata.
    NowPlayingChanged(TrackMetadata),
    /// A guarded operation was requested while the track list was empty.
    PlaylistEmpty,
}

/// Asynchronous notifications from the engine adapter into the core.
#[derive(Debug, Clone)]
pub enum EngineNotification {
    /// The engine's current index changed (navigation, track end, removal).
    IndexChanged(usize),
}
