use log::debug;

/// Read-mirror of the engine-owned current index.
///
/// The engine is authoritative; this mirror moves only on explicit
/// notification and never guesses. `None` means no track is selected
/// (empty session, or the list emptied out from under the engine).
pub struct PlaybackIndex {
    current: Option<usize>,
}

impl PlaybackIndex {
    pub fn new() -> PlaybackIndex {
        PlaybackIndex { current: None }
    }

    /// Applies an engine index notification.
    ///
    /// Out-of-bounds indices are ignored: between a removal and the engine's
    /// follow-up notification the mirror and the engine can briefly disagree,
    /// and a stale index must not crash the session.
    pub fn on_external_index_changed(&mut self, index: usize, num_tracks: usize) -> bool {
        if index >= num_tracks {
            debug!(
                "PlaybackIndex: ignoring index {} outside track list of length {}",
                index, num_tracks
            );
            return false;
        }
        self.current = Some(index);
        true
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
