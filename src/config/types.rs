//! Resolved configuration structs.

use std::path::PathBuf;
use std::time::Duration;

/// PTY (console) channel configuration.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    pub enabled: bool,
}

/// HTTP (axum) channel configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub enabled: bool,
    /// Socket address to bind the HTTP channel to.
    pub bind: String,
}

/// Comms subsystem configuration.
#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub pty: PtyConfig,
    pub http: HttpConfig,
}

/// Itinerary planner configuration (`[planner]`).
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Simulated processing delay before a preference update is committed.
    pub update_delay_ms: u64,
    /// Inclusive bounds for the number of map locations picked on a
    /// preference update.
    pub sample_min: usize,
    pub sample_max: usize,
    /// Fixed RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl PlannerConfig {
    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }
}

/// Chat turn configuration (`[chat]`).
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Delay before the canned agent reply is appended.
    pub reply_delay_ms: u64,
    pub seed: Option<u64>,
}

impl ChatConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

/// Map view configuration (`[map]`).
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lng: f64,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub log_level: String,
    /// Optional log file (already expanded, no `~`). Logs go to stderr when unset.
    pub log_file: Option<PathBuf>,
    pub planner: PlannerConfig,
    pub chat: ChatConfig,
    pub map: MapConfig,
    pub comms: CommsConfig,
    /// Map SDK key from the `MAP_API_KEY` env var. Never sourced from TOML.
    pub map_api_key: Option<String>,
}

impl Config {
    /// Returns `true` if the PTY channel should be loaded.
    pub fn comms_pty_should_load(&self) -> bool {
        self.comms.pty.enabled
    }

    /// Returns `true` if the HTTP channel should be loaded.
    pub fn comms_http_should_load(&self) -> bool {
        self.comms.http.enabled
    }
}
