// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: non-zero windows and
//! timeouts, a usable debounce multiplier, and a known log level.

use crate::diagnostic::ConfigError;
use crate::model::StreamlineConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &StreamlineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "log.level `{}` is not one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.classifier.max_content_chars == 0 {
        fail("classifier.max_content_chars must be greater than 0".to_string());
    }

    let scheduler = &config.scheduler;
    if scheduler.base_debounce_ms == 0 {
        fail("scheduler.base_debounce_ms must be greater than 0".to_string());
    }
    if scheduler.sync_threshold_chars == 0 {
        fail("scheduler.sync_threshold_chars must be greater than 0".to_string());
    }
    if scheduler.large_content_multiplier < 1 {
        fail(format!(
            "scheduler.large_content_multiplier must be at least 1, got {}",
            scheduler.large_content_multiplier
        ));
    }
    if scheduler.idle_timeout_ms == 0 {
        fail("scheduler.idle_timeout_ms must be greater than 0".to_string());
    }
    if scheduler.sync_threshold_chars >= config.classifier.max_content_chars {
        fail(format!(
            "scheduler.sync_threshold_chars ({}) must be below classifier.max_content_chars ({})",
            scheduler.sync_threshold_chars, config.classifier.max_content_chars
        ));
    }

    if config.matcher.prefix_window_chars == 0 {
        fail("matcher.prefix_window_chars must be greater than 0".to_string());
    }

    if config.recovery.resume_timeout_ms == 0 {
        fail("recovery.resume_timeout_ms must be greater than 0".to_string());
    }

    if config.render.max_height == Some(0) {
        fail("render.max_height must be greater than 0 when set".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
