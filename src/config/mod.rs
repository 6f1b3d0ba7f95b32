//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` (or an explicit `--config` path) and applies
//! the `WANDERWISE_LOG_LEVEL` env override. When no file exists a hardcoded
//! default is used so the binary runs out of the box.
//!
//! # Module layout
//!
//! - **types** — resolved structs consumed by subsystems (`Config`,
//!   `PlannerConfig`, `ChatConfig`, …).
//! - **raw** — serde targets mirroring the TOML shape; private.
//! - **load** — `[meta] base` inheritance, resolution and validation.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from};
pub use types::*;

impl Config {
    /// Deterministic config for tests: seeded RNGs, default delays, no channels.
    pub fn test_default() -> Self {
        Self {
            app_name: "test".into(),
            log_level: "info".into(),
            log_file: None,
            planner: PlannerConfig {
                update_delay_ms: 1500,
                sample_min: 4,
                sample_max: 6,
                seed: Some(7),
            },
            chat: ChatConfig {
                reply_delay_ms: 1000,
                seed: Some(11),
            },
            map: MapConfig {
                center_lat: raw::default_center_lat(),
                center_lng: raw::default_center_lng(),
            },
            comms: CommsConfig {
                pty: PtyConfig { enabled: false },
                http: HttpConfig {
                    enabled: false,
                    bind: raw::default_http_bind(),
                },
            },
            map_api_key: None,
        }
    }
}
