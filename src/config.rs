//! Persistent session configuration model and defaults.

use crate::engine::PlayMode;

/// Root configuration persisted to `playdeck.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Session manager behavior.
    pub session: SessionConfig,
}

/// Session manager preferences persisted between runs.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SessionConfig {
    /// Broadcast bus capacity shared by all components.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
    /// Upper bound on a single source resolution, in milliseconds.
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: u64,
    /// Play mode applied to the engine at session start.
    #[serde(default)]
    pub play_mode: PlayMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bus_capacity: default_bus_capacity(),
            resolve_timeout_ms: default_resolve_timeout_ms(),
            play_mode: PlayMode::default(),
        }
    }
}

fn default_bus_capacity() -> usize {
    1024
}

fn default_resolve_timeout_ms() -> u64 {
    10_000
}
