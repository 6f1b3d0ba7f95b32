//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies the `WANDERWISE_LOG_LEVEL` env override.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

use super::raw::{self, RawConfig};
use super::types::*;

/// Deep-merge two TOML values.
/// Tables merge recursively; any other overlay value replaces the base value.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base` chain, and return the merged
/// value. `visited` holds canonical paths already seen so cycles are rejected.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay: toml::Value = toml::from_str(&text)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let base_ref = overlay
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
        .map(str::to_string);

    match base_ref {
        Some(base_str) => {
            let base_path = if Path::new(&base_str).is_absolute() {
                PathBuf::from(base_str)
            } else {
                path.parent().unwrap_or(Path::new(".")).join(base_str)
            };
            let base = load_raw_merged(&base_path, visited)?;
            Ok(merge_toml(base, overlay))
        }
        None => Ok(overlay),
    }
}

/// Load config from the given path, or `config/default.toml`, then apply env
/// overrides. Without an explicit path and without `config/default.toml`,
/// the hardcoded defaults are returned.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let log_level_override = env::var("WANDERWISE_LOG_LEVEL").ok();

    if let Some(path) = config_path {
        return load_from(Path::new(path), log_level_override.as_deref());
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        return load_from(default_path, log_level_override.as_deref());
    }

    let mut parsed: RawConfig = toml::from_str("[supervisor]")
        .map_err(|e| AppError::Config(format!("builtin defaults: {e}")))?;
    if let Some(level) = log_level_override {
        parsed.supervisor.log_level = level;
    }
    resolve(parsed)
}

/// Internal loader — accepts an explicit path and an optional level override.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(path: &Path, log_level_override: Option<&str>) -> Result<Config, AppError> {
    let merged = load_raw_merged(path, &mut HashSet::new())?;

    let mut parsed = RawConfig::deserialize(merged).map_err(|e: toml::de::Error| {
        AppError::Config(format!("config error in {}: {e}", path.display()))
    })?;

    if let Some(level) = log_level_override {
        parsed.supervisor.log_level = level.to_string();
    }

    resolve(parsed)
}

fn resolve(parsed: RawConfig) -> Result<Config, AppError> {
    let p = parsed.planner;
    if p.sample_min == 0 || p.sample_min > p.sample_max {
        return Err(AppError::Config(format!(
            "planner.sample_min ({}) must be >= 1 and <= planner.sample_max ({})",
            p.sample_min, p.sample_max
        )));
    }

    let s = parsed.supervisor;
    if s.log_level.trim().is_empty() {
        return Err(AppError::Config("supervisor.log_level must not be empty".into()));
    }
    // Plain levels are checked here; full filter directives are left to the logger.
    if !s.log_level.contains(['=', ',']) {
        crate::logger::parse_level(s.log_level.trim())
            .map_err(|e| AppError::Config(format!("supervisor.log_level: {e}")))?;
    }

    Ok(Config {
        app_name: s.app_name,
        log_level: s.log_level,
        log_file: s.log_file.as_deref().map(expand_home),
        planner: PlannerConfig {
            update_delay_ms: p.update_delay_ms,
            sample_min: p.sample_min,
            sample_max: p.sample_max,
            seed: p.seed,
        },
        chat: ChatConfig {
            reply_delay_ms: parsed.chat.reply_delay_ms,
            seed: parsed.chat.seed,
        },
        map: MapConfig {
            center_lat: parsed.map.center_lat,
            center_lng: parsed.map.center_lng,
        },
        comms: CommsConfig {
            pty: PtyConfig { enabled: parsed.comms.pty.enabled },
            http: HttpConfig {
                enabled: parsed.comms.http.enabled,
                bind: parsed.comms.http.bind,
            },
        },
        map_api_key: env::var("MAP_API_KEY").ok().filter(|k| !k.trim().is_empty()),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
