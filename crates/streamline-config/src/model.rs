// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Streamline pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use streamline_core::types::{ContentKind, ProcessingOptions};

/// Top-level Streamline configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to the tuned values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StreamlineConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Content classification settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Processing scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Recoverable stream matching settings.
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Resume/discard settings.
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Options forwarded to the render collaborator.
    #[serde(default)]
    pub render: RenderConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Content classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Content longer than this many characters is never processed.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_content_chars: default_max_content_chars(),
        }
    }
}

fn default_max_content_chars() -> usize {
    10_000
}

/// Processing scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Quiet period before a processing job runs.
    #[serde(default = "default_base_debounce_ms")]
    pub base_debounce_ms: u64,

    /// Content above this many characters is debounced longer and deferred to idle time.
    #[serde(default = "default_sync_threshold_chars")]
    pub sync_threshold_chars: usize,

    /// Debounce multiplier applied to content above the sync threshold.
    #[serde(default = "default_large_content_multiplier")]
    pub large_content_multiplier: u32,

    /// Hard ceiling on waiting for idle time before running anyway.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            base_debounce_ms: default_base_debounce_ms(),
            sync_threshold_chars: default_sync_threshold_chars(),
            large_content_multiplier: default_large_content_multiplier(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

impl SchedulerConfig {
    pub fn base_debounce(&self) -> Duration {
        Duration::from_millis(self.base_debounce_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

fn default_base_debounce_ms() -> u64 {
    200
}

fn default_sync_threshold_chars() -> usize {
    1_000
}

fn default_large_content_multiplier() -> u32 {
    2
}

fn default_idle_timeout_ms() -> u64 {
    300
}

/// Recoverable stream matcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatcherConfig {
    /// Number of leading characters of a stream snapshot compared against message content.
    #[serde(default = "default_prefix_window_chars")]
    pub prefix_window_chars: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            prefix_window_chars: default_prefix_window_chars(),
        }
    }
}

fn default_prefix_window_chars() -> usize {
    100
}

/// Resume/discard configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecoveryConfig {
    /// Time after which a pending resume or discard is abandoned and the message unlocked.
    #[serde(default = "default_resume_timeout_ms")]
    pub resume_timeout_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            resume_timeout_ms: default_resume_timeout_ms(),
        }
    }
}

impl RecoveryConfig {
    pub fn resume_timeout(&self) -> Duration {
        Duration::from_millis(self.resume_timeout_ms)
    }
}

fn default_resume_timeout_ms() -> u64 {
    15_000
}

/// Render collaborator options.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Number code block lines.
    #[serde(default)]
    pub show_line_numbers: bool,

    /// Maximum rendered height in pixels for code blocks. `None` means unbounded.
    #[serde(default)]
    pub max_height: Option<u32>,

    /// Pass raw HTML in message content through to the output.
    #[serde(default)]
    pub allow_html: bool,
}

impl RenderConfig {
    /// Builds the processing options for content of the given kind.
    pub fn options_for(&self, kind: ContentKind) -> ProcessingOptions {
        ProcessingOptions {
            kind,
            show_line_numbers: self.show_line_numbers,
            max_height: self.max_height,
            allow_html: self.allow_html,
        }
    }
}
