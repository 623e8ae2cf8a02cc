//! Scripted demo session against a stand-in engine and resolver.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::info;
use tokio::sync::broadcast::{self, error::TryRecvError, Sender};
use uuid::Uuid;

use playdeck::config::Config;
use playdeck::engine::{PlayMode, PlaybackEngine, PlaybackState};
use playdeck::error::ResolveError;
use playdeck::protocol::{AlbumInfo, EngineNotification, Message, SessionMessage, TrackMetadata};
use playdeck::resolver::{PlayableHandle, TrackResolver};
use playdeck::session_manager::SessionManager;

struct UrlResolver;

impl TrackResolver for UrlResolver {
    fn resolve(&self, source: &str) -> Result<PlayableHandle, ResolveError> {
        if source.is_empty() {
            return Err(ResolveError::Failed("empty source descriptor".to_string()));
        }
        Ok(PlayableHandle::new(format!("media:{source}")))
    }
}

/// Stand-in renderer: keeps a media list, logs every command, and echoes
/// index changes back onto the bus the way a real engine adapter would.
struct EchoEngine {
    bus_sender: Sender<Message>,
    media: Vec<PlayableHandle>,
    current: Option<usize>,
    state: PlaybackState,
}

impl EchoEngine {
    fn new(bus_sender: Sender<Message>) -> Self {
        Self {
            bus_sender,
            media: Vec::new(),
            current: None,
            state: PlaybackState::Stopped,
        }
    }

    fn notify_index(&self) {
        if let Some(index) = self.current {
            let _ = self
                .bus_sender
                .send(Message::Engine(EngineNotification::IndexChanged(index)));
        }
    }
}

impl PlaybackEngine for EchoEngine {
    fn append_media(&mut self, handle: PlayableHandle) {
        info!("EchoEngine: appended {}", handle.uri());
        self.media.push(handle);
    }

    fn remove_media_at(&mut self, index: usize) {
        if index < self.media.len() {
            self.media.remove(index);
        }
        if let Some(current) = self.current {
            if self.media.is_empty() {
                self.current = None;
            } else if index < current {
                self.current = Some(current - 1);
                self.notify_index();
            } else if current >= self.media.len() {
                self.current = Some(self.media.len() - 1);
                self.notify_index();
            }
        }
    }

    fn set_current_index(&mut self, index: usize) {
        if index < self.media.len() {
            self.current = Some(index);
            self.notify_index();
        }
    }

    fn current_index(&self) -> Option<usize> {
        self.current
    }

    fn play(&mut self) {
        self.state = PlaybackState::Playing;
        info!("EchoEngine: play (current {:?})", self.current);
    }

    fn pause(&mut self) {
        self.state = PlaybackState::Paused;
        info!("EchoEngine: pause");
    }

    fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        info!("EchoEngine: stop");
    }

    fn advance_next(&mut self) {
        if self.media.is_empty() {
            return;
        }
        let next = self.current.map_or(0, |current| (current + 1) % self.media.len());
        self.current = Some(next);
        self.notify_index();
    }

    fn advance_previous(&mut self) {
        if self.media.is_empty() {
            return;
        }
        let previous = self.current.map_or(0, |current| {
            (current + self.media.len() - 1) % self.media.len()
        });
        self.current = Some(previous);
        self.notify_index();
    }

    fn is_empty(&self) -> bool {
        self.media.is_empty()
    }

    fn playback_state(&self) -> PlaybackState {
        self.state
    }

    fn set_play_mode(&mut self, mode: PlayMode) {
        info!("EchoEngine: play mode set to {:?}", mode);
    }
}

fn demo_track(name: &str, source: &str) -> TrackMetadata {
    TrackMetadata {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        artists: vec!["unknown".to_string()],
        album: AlbumInfo {
            name: "test".to_string(),
        },
        duration_ms: 2000,
        source: source.to_string(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Debug);
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    let config_dir = dirs::config_dir().ok_or("could not determine config directory")?;
    let config_file = config_dir.join("playdeck.toml");

    if !config_file.exists() {
        let default_config = Config::default();
        info!(
            "Config file not found. Creating default config. path={}",
            config_file.display()
        );
        std::fs::write(&config_file, toml::to_string(&default_config)?)?;
    }

    let config_content = std::fs::read_to_string(&config_file)?;
    let config = toml::from_str::<Config>(&config_content).unwrap_or_default();

    // Bus for communication between components
    let (bus_sender, _) = broadcast::channel(config.session.bus_capacity);

    let engine = Box::new(EchoEngine::new(bus_sender.clone()));
    let resolver = Arc::new(UrlResolver);
    let manager_receiver = bus_sender.subscribe();
    let manager_bus_sender = bus_sender.clone();
    let session_config = config.session.clone();
    thread::Builder::new()
        .name("session-manager".to_string())
        .spawn(move || {
            let mut manager = SessionManager::new(
                engine,
                resolver,
                &session_config,
                manager_receiver,
                manager_bus_sender,
            );
            manager.run();
        })?;

    let mut ui_receiver = bus_sender.subscribe();

    let secret_base = demo_track(
        "secret base",
        "https://tracks.example/2053887720715417.mp3",
    );
    let way_back = demo_track(
        "way back into love",
        "https://tracks.example/2022001883489851.mp3",
    );

    bus_sender.send(Message::Session(SessionMessage::AddTrack(
        secret_base.clone(),
    )))?;
    // Same id again: the session keeps a single copy.
    bus_sender.send(Message::Session(SessionMessage::AddTrack(
        secret_base.clone(),
    )))?;
    bus_sender.send(Message::Session(SessionMessage::PlayTrack(way_back)))?;
    bus_sender.send(Message::Session(SessionMessage::PlayNext))?;
    bus_sender.send(Message::Session(SessionMessage::RemoveTrack(
        secret_base.id,
    )))?;

    // Watch the session's notifications for a moment, then exit.
    let deadline = Instant::now() + Duration::from_millis(500);
    while Instant::now() < deadline {
        match ui_receiver.try_recv() {
            Ok(Message::Session(SessionMessage::NowPlayingChanged(track))) => {
                info!("Demo: now playing '{}'", track.name);
            }
            Ok(Message::Session(SessionMessage::PlaylistEmpty)) => {
                info!("Demo: playlist is empty");
            }
            Ok(_) => {}
            Err(TryRecvError::Empty) => thread::sleep(Duration::from_millis(10)),
            Err(_) => break,
        }
    }

    Ok(())
}
