//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawConfig {
    pub supervisor: RawSupervisor,
    #[serde(default)]
    pub planner: RawPlanner,
    #[serde(default)]
    pub chat: RawChat,
    #[serde(default)]
    pub map: RawMap,
    #[serde(default)]
    pub comms: RawComms,
}

#[derive(Deserialize)]
pub(super) struct RawSupervisor {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

// ── Planner / chat / map ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawPlanner {
    #[serde(default = "default_update_delay_ms")]
    pub update_delay_ms: u64,
    #[serde(default = "default_sample_min")]
    pub sample_min: usize,
    #[serde(default = "default_sample_max")]
    pub sample_max: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RawPlanner {
    fn default() -> Self {
        Self {
            update_delay_ms: default_update_delay_ms(),
            sample_min: default_sample_min(),
            sample_max: default_sample_max(),
            seed: None,
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawChat {
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RawChat {
    fn default() -> Self {
        Self { reply_delay_ms: default_reply_delay_ms(), seed: None }
    }
}

#[derive(Deserialize)]
pub(super) struct RawMap {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lng")]
    pub center_lng: f64,
}

impl Default for RawMap {
    fn default() -> Self {
        Self { center_lat: default_center_lat(), center_lng: default_center_lng() }
    }
}

// ── Comms ───────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawComms {
    #[serde(default)]
    pub pty: RawPty,
    #[serde(default)]
    pub http: RawHttp,
}

#[derive(Deserialize)]
pub(super) struct RawPty {
    /// Defaults to `true`; `main` still disables it without `-i`.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for RawPty {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Deserialize)]
pub(super) struct RawHttp {
    #[serde(default = "default_false")]
    pub enabled: bool,
    #[serde(default = "default_http_bind")]
    pub bind: String,
}

impl Default for RawHttp {
    fn default() -> Self {
        Self { enabled: false, bind: default_http_bind() }
    }
}

// ── Defaults ────────────────────────────────────────────────────────────────

pub(super) fn default_app_name() -> String { "wanderwise".to_string() }
pub(super) fn default_log_level() -> String { "info".to_string() }
pub(super) fn default_update_delay_ms() -> u64 { 1500 }
pub(super) fn default_reply_delay_ms() -> u64 { 1000 }
pub(super) fn default_sample_min() -> usize { 4 }
pub(super) fn default_sample_max() -> usize { 6 }
pub(super) fn default_center_lat() -> f64 { 7.8731 }
pub(super) fn default_center_lng() -> f64 { 80.7718 }
pub(super) fn default_http_bind() -> String { "127.0.0.1:8080".to_string() }

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}
