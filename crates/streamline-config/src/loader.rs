// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./streamline.toml` > `~/.config/streamline/streamline.toml`
//! > `/etc/streamline/streamline.toml` with environment variable overrides via
//! the `STREAMLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::StreamlineConfig;

/// Section names recognised in `STREAMLINE_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["log", "classifier", "scheduler", "matcher", "recovery", "render"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/streamline/streamline.toml` (system-wide)
/// 3. `~/.config/streamline/streamline.toml` (user XDG config)
/// 4. `./streamline.toml` (local directory)
/// 5. `STREAMLINE_*` environment variables
pub fn load_config() -> Result<StreamlineConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<StreamlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StreamlineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StreamlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StreamlineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(StreamlineConfig::default()))
        .merge(Toml::file("/etc/streamline/streamline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("streamline/streamline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("streamline.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` instead of `Env::split("_")` because key names contain
/// underscores: `STREAMLINE_SCHEDULER_BASE_DEBOUNCE_MS` must map to
/// `scheduler.base_debounce_ms`, not `scheduler.base.debounce.ms`.
fn env_provider() -> Env {
    Env::prefixed("STREAMLINE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
