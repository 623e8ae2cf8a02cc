//! Capability boundary to the external media-rendering engine.
//!
//! The session manager issues commands through [`PlaybackEngine`] and mirrors
//! the engine's index through notifications; it never decodes or renders
//! audio itself. Engine commands are assumed to succeed — anything the engine
//! wants to report back travels over its own notification channel.

use crate::resolver::PlayableHandle;

/// Coarse playback state reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

/// Traversal behavior applied when the engine reaches the end of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Play the current track once, then stop.
    Once,
    /// Repeat the current track.
    LoopTrack,
    /// Play through the list in order, then stop.
    Sequential,
    /// Play through the list in order, wrapping to the start.
    #[default]
    LoopList,
    /// Pick a random track each time.
    Random,
}

/// Commands the session manager issues to the rendering engine.
///
/// Indices refer to the engine's media list, which the manager keeps aligned
/// with its own track list. The engine owns the authoritative current index;
/// the manager only mirrors it from `IndexChanged` notifications.
pub trait PlaybackEngine: Send {
    /// Appends a resolved media entry at the end of the engine's list.
    fn append_media(&mut self, handle: PlayableHandle);
    /// Removes the media entry at `index`.
    fn remove_media_at(&mut self, index: usize);
    /// Selects the media entry at `index` as current.
    fn set_current_index(&mut self, index: usize);
    /// The engine's own view of the current index, if any.
    fn current_index(&self) -> Option<usize>;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Advances to the next entry per the active play mode.
    fn advance_next(&mut self);
    /// Steps back to the previous entry per the active play mode.
    fn advance_previous(&mut self);
    fn is_empty(&self) -> bool;
    fn playback_state(&self) -> PlaybackState;
    fn set_play_mode(&mut self, mode: PlayMode);
}
