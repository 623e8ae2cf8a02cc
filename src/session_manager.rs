//! Session-domain orchestrator.
//!
//! This component composes the track list, the source cache, and the
//! engine-index mirror, and is the sole entry point for UI commands and
//! engine notifications. It consumes bus messages on a dedicated thread and
//! emits session notifications back onto the bus.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::broadcast::{error::RecvError, Receiver, Sender};

use crate::{
    config::SessionConfig,
    engine::{PlayMode, PlaybackEngine, PlaybackState},
    error::SessionError,
    playback_index::PlaybackIndex,
    protocol::{EngineNotification, Message, SessionMessage, TrackMetadata},
    resolver::TrackResolver,
    source_cache::SourceCache,
    track_list::TrackList,
};

/// Coordinates the playback session between the UI and the rendering engine.
///
/// All mutating operations run on the thread that owns the manager; the bus
/// serializes UI commands and engine notifications into that thread, so the
/// list, cache, and index mirror always mutate as one unit.
pub struct SessionManager {
    track_list: TrackList,
    source_cache: SourceCache,
    playback_index: PlaybackIndex,
    engine: Box<dyn PlaybackEngine>,
    bus_consumer: Receiver<Message>,
    bus_producer: Sender<Message>,
}

impl SessionManager {
    /// Creates a session manager bound to bus channels and its collaborators.
    pub fn new(
        mut engine: Box<dyn PlaybackEngine>,
        resolver: Arc<dyn TrackResolver>,
        config: &SessionConfig,
        bus_consumer: Receiver<Message>,
        bus_producer: Sender<Message>,
    ) -> Self {
        engine.set_play_mode(config.play_mode);
        Self {
            track_list: TrackList::new(),
            source_cache: SourceCache::new(
                resolver,
                Duration::from_millis(config.resolve_timeout_ms),
            ),
            playback_index: PlaybackIndex::new(),
            engine,
            bus_consumer,
            bus_producer,
        }
    }

    /// Appends the track unless its id is already listed.
    ///
    /// On insertion the source is resolved and the handle appended to the
    /// engine's media list at the same index. A resolution failure rolls the
    /// insertion back so the list and the engine stay aligned, and is never
    /// cached, so the caller may retry.
    pub fn add(&mut self, metadata: TrackMetadata) -> Result<bool, SessionError> {
        let (inserted, index) = self.track_list.try_add(metadata.clone());
        if !inserted {
            debug!(
                "SessionManager: track {} already listed at index {}",
                metadata.id, index
            );
            return Ok(false);
        }

        let handle = match self.source_cache.resolve(&metadata) {
            Ok(handle) => handle,
            Err(e) => {
                self.track_list.remove_by_id(&metadata.id);
                return Err(e.into());
            }
        };
        self.engine.append_media(handle);
        info!(
            "SessionManager: added '{}' at index {}",
            metadata.name, index
        );
        let _ = self.bus_producer.send(Message::Session(SessionMessage::TrackAdded {
            id: metadata.id,
            index,
        }));
        Ok(true)
    }

    /// Plays a specific track, adding it to the session first if needed, or
    /// resumes the engine when no track is given.
    ///
    /// Returns whether a new track was added.
    pub fn play(&mut self, metadata: Option<TrackMetadata>) -> Result<bool, SessionError> {
        let Some(metadata) = metadata else {
            self.engine.play();
            return Ok(false);
        };

        let inserted = self.add(metadata.clone())?;
        let Some(index) = self.track_list.index_of(&metadata.id) else {
            error!(
                "SessionManager: track {} vanished between add and play",
                metadata.id
            );
            return Ok(inserted);
        };

        self.engine.stop();
        self.engine.set_current_index(index);
        self.engine.play();
        Ok(inserted)
    }

    // Early-return guard shared by the toggle/navigation operations.
    fn notify_if_playlist_empty(&self) -> bool {
        if self.track_list.is_empty() {
            let _ = self
                .bus_producer
                .send(Message::Session(SessionMessage::PlaylistEmpty));
            return true;
        }
        false
    }

    /// Toggles between playing and paused; stopped stays stopped.
    pub fn play_or_pause(&mut self) {
        if self.notify_if_playlist_empty() {
            return;
        }
        match self.engine.playback_state() {
            PlaybackState::Playing => self.engine.pause(),
            PlaybackState::Paused => self.engine.play(),
            PlaybackState::Stopped => {}
        }
    }

    pub fn play_next(&mut self) {
        if self.notify_if_playlist_empty() {
            return;
        }
        self.engine.advance_next();
    }

    pub fn play_last(&mut self) {
        if self.notify_if_playlist_empty() {
            return;
        }
        self.engine.advance_previous();
    }

    /// Removes the track with the given id from the session.
    ///
    /// Returns whether a listed track was removed. The cache entry is purged
    /// either way; a stray entry must not outlive its track.
    pub fn remove(&mut self, id: &str) -> bool {
        // Identity decides "currently playing", not raw position; the mirror
        // may lag the engine during removal races.
        let removing_playing = self
            .playback_index
            .current()
            .and_then(|index| self.track_list.metadata_at(index).ok())
            .is_some_and(|metadata| metadata.id == id);

        let (removed, removed_index) = self.track_list.remove_by_id(id);
        if let Some(index) = removed_index {
            if removing_playing {
                // Stop first to avoid an audible cut-off mid-buffer, and ask
                // for the next entry while the doomed one is still present so
                // the engine's index arithmetic stays well-defined.
                self.engine.stop();
                self.engine.advance_next();
            }
            self.engine.remove_media_at(index);
            if self.track_list.is_empty() {
                self.playback_index.clear();
            }
            info!("SessionManager: removed track {} from index {}", id, index);
            let _ = self.bus_producer.send(Message::Session(SessionMessage::TrackRemoved {
                id: id.to_string(),
                index,
            }));
        }

        if self.source_cache.purge(id) && !removed {
            debug!(
                "SessionManager: purged cache entry for unlisted track {}",
                id
            );
        }
        removed
    }

    pub fn is_track_present(&self, id: &str) -> bool {
        self.track_list.contains(id)
    }

    /// Applies an engine index notification and announces the now-playing
    /// track. Out-of-bounds indices are dropped by the mirror.
    pub fn on_external_index_changed(&mut self, index: usize) {
        let accepted = self
            .playback_index
            .on_external_index_changed(index, self.track_list.num_tracks());
        if !accepted {
            return;
        }
        match self.track_list.metadata_at(index) {
            Ok(metadata) => {
                let _ = self.bus_producer.send(Message::Session(
                    SessionMessage::NowPlayingChanged(metadata.clone()),
                ));
            }
            Err(e) => error!(
                "SessionManager: no metadata behind accepted index {}: {}",
                index, e
            ),
        }
    }

    /// Installs a new track list wholesale, rebuilding the cache and the
    /// engine media list to match.
    ///
    /// Tracks whose source fails to resolve are dropped from the installed
    /// list; the three collections must stay aligned.
    pub fn replace_all(&mut self, tracks: Vec<TrackMetadata>) {
        self.engine.stop();
        for index in (0..self.track_list.num_tracks()).rev() {
            self.engine.remove_media_at(index);
        }
        self.playback_index.clear();
        self.track_list.replace_all(tracks);

        let installed: Vec<TrackMetadata> = (0..self.track_list.num_tracks())
            .filter_map(|index| self.track_list.metadata_at(index).ok().cloned())
            .collect();
        let ids: HashSet<String> = installed.iter().map(|metadata| metadata.id.clone()).collect();
        self.source_cache.retain_ids(&ids);

        for metadata in installed {
            match self.source_cache.resolve(&metadata) {
                Ok(handle) => self.engine.append_media(handle),
                Err(e) => {
                    error!(
                        "SessionManager: dropping '{}' from installed list: {}",
                        metadata.name, e
                    );
                    self.track_list.remove_by_id(&metadata.id);
                    self.source_cache.purge(&metadata.id);
                }
            }
        }

        info!(
            "SessionManager: installed track list with {} tracks",
            self.track_list.num_tracks()
        );
        let _ = self.bus_producer.send(Message::Session(SessionMessage::TracksReplaced {
            count: self.track_list.num_tracks(),
        }));
    }

    pub fn set_play_mode(&mut self, mode: PlayMode) {
        self.engine.set_play_mode(mode);
    }

    /// Consumes bus traffic until every producer is gone.
    pub fn run(&mut self) {
        loop {
            match self.bus_consumer.blocking_recv() {
                Ok(message) => self.dispatch(message),
                Err(RecvError::Lagged(skipped)) => {
                    error!("SessionManager: bus lagged, {} messages skipped", skipped);
                }
                Err(RecvError::Closed) => {
                    info!("SessionManager: bus closed, exiting");
                    break;
                }
            }
        }
    }

    fn dispatch(&mut self, message: Message) {
        match message {
            Message::Session(SessionMessage::AddTrack(metadata)) => {
                debug!("SessionManager: AddTrack {}", metadata.id);
                if let Err(e) = self.add(metadata) {
                    error!("SessionManager: add failed: {}", e);
                }
            }
            Message::Session(SessionMessage::PlayTrack(metadata)) => {
                debug!("SessionManager: PlayTrack {}", metadata.id);
                if let Err(e) = self.play(Some(metadata)) {
                    error!("SessionManager: play failed: {}", e);
                }
            }
            Message::Session(SessionMessage::Resume) => {
                if let Err(e) = self.play(None) {
                    error!("SessionManager: resume failed: {}", e);
                }
            }
            Message::Session(SessionMessage::PlayOrPause) => self.play_or_pause(),
            Message::Session(SessionMessage::PlayNext) => self.play_next(),
            Message::Session(SessionMessage::PlayLast) => self.play_last(),
            Message::Session(SessionMessage::RemoveTrack(id)) => {
                self.remove(&id);
            }
            Message::Session(SessionMessage::ReplaceTracks(tracks)) => self.replace_all(tracks),
            Message::Session(SessionMessage::SetPlayMode(mode)) => self.set_play_mode(mode),
            Message::Engine(EngineNotification::IndexChanged(index)) => {
                self.on_external_index_changed(index);
            }
            // Our own notifications echo back over the broadcast bus.
            Message::Session(_) => {}
        }
    }
}
