// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Streamline configuration system.

use std::io::Write;

use streamline_config::diagnostic::ConfigError;
use streamline_config::model::StreamlineConfig;
use streamline_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use streamline_core::types::ContentKind;

/// Every section deserializes from a fully specified file.
#[test]
fn valid_toml_deserializes_into_streamline_config() {
    let toml = r#"
[log]
level = "debug"

[classifier]
max_content_chars = 12000

[scheduler]
base_debounce_ms = 150
sync_threshold_chars = 2000
large_content_multiplier = 3
idle_timeout_ms = 500

[matcher]
prefix_window_chars = 64

[recovery]
resume_timeout_ms = 5000

[render]
show_line_numbers = true
max_height = 600
allow_html = true
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.classifier.max_content_chars, 12_000);
    assert_eq!(config.scheduler.base_debounce_ms, 150);
    assert_eq!(config.scheduler.sync_threshold_chars, 2_000);
    assert_eq!(config.scheduler.large_content_multiplier, 3);
    assert_eq!(config.scheduler.idle_timeout_ms, 500);
    assert_eq!(config.matcher.prefix_window_chars, 64);
    assert_eq!(config.recovery.resume_timeout_ms, 5_000);
    assert!(config.render.show_line_numbers);
    assert_eq!(config.render.max_height, Some(600));
    assert!(config.render.allow_html);
}

/// Missing sections fall back to the tuned defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.log.level, "info");
    assert_eq!(config.classifier.max_content_chars, 10_000);
    assert_eq!(config.scheduler.base_debounce_ms, 200);
    assert_eq!(config.scheduler.sync_threshold_chars, 1_000);
    assert_eq!(config.scheduler.large_content_multiplier, 2);
    assert_eq!(config.scheduler.idle_timeout_ms, 300);
    assert_eq!(config.matcher.prefix_window_chars, 100);
    assert_eq!(config.recovery.resume_timeout_ms, 15_000);
    assert!(!config.render.show_line_numbers);
    assert!(config.render.max_height.is_none());
}

/// Unknown key in [scheduler] is reported with a suggestion and the valid keys.
#[test]
fn unknown_scheduler_key_suggests_correction() {
    let toml = r#"
[scheduler]
base_debounse_ms = 100
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "base_debounse_ms"
                && suggestion.as_deref() == Some("base_debounce_ms")
                && valid_keys.contains("idle_timeout_ms")
        })
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_top_level_section() {
    let toml = r#"
[telemetry]
endpoint = "http://localhost"
"#;

    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("telemetry"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// A string where a number is expected yields an InvalidType diagnostic.
#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[matcher]
prefix_window_chars = "wide"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("prefix_window_chars"))),
        "got: {errors:?}"
    );
}

/// A wrongly typed value in a file points back at the offending key.
#[test]
fn invalid_type_in_file_carries_source_span() {
    let content = "[log]\nlevel = \"info\"\n\n[matcher]\nprefix_window_chars = \"wide\"\n";
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "{content}").expect("write config");

    let errors = load_and_validate_path(file.path()).expect_err("should reject invalid type");
    let (span, src) = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::InvalidType { span, src, .. } => Some((*span, src.is_some())),
            _ => None,
        })
        .expect("expected an InvalidType diagnostic");

    let span = span.expect("span should be resolved");
    assert_eq!(span.offset(), content.find("prefix_window_chars").expect("present"));
    assert_eq!(span.len(), "prefix_window_chars".len());
    assert!(src);
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_runs_after_parse() {
    let toml = r#"
[recovery]
resume_timeout_ms = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero timeout should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("resume_timeout_ms"))
    }));
}

/// Figment overrides on dotted paths reach nested keys.
#[test]
fn dotted_override_reaches_nested_key() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: StreamlineConfig = Figment::new()
        .merge(Serialized::defaults(StreamlineConfig::default()))
        .merge(Toml::string("[scheduler]\nbase_debounce_ms = 100\n"))
        .merge(("scheduler.base_debounce_ms", 75))
        .extract()
        .expect("should merge override");

    assert_eq!(config.scheduler.base_debounce_ms, 75);
}

/// Loading from an explicit path works and missing files are skipped.
#[test]
fn load_from_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[matcher]\nprefix_window_chars = 40").expect("write config");

    let config = load_and_validate_path(file.path()).expect("file config should validate");
    assert_eq!(config.matcher.prefix_window_chars, 40);

    let config = load_and_validate_path(std::path::Path::new("/nonexistent/streamline.toml"))
        .expect("missing file should fall back to defaults");
    assert_eq!(config.matcher.prefix_window_chars, 100);
}

/// Render options carry the classification kind through.
#[test]
fn render_config_builds_processing_options() {
    let config = load_config_from_str("[render]\nallow_html = true\n").expect("valid");
    let options = config.render.options_for(ContentKind::Code);
    assert_eq!(options.kind, ContentKind::Code);
    assert!(options.allow_html);
    assert!(!options.show_line_numbers);
}

/// ConfigError renders through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "prefix_widow_chars".to_string(),
        suggestion: Some("prefix_window_chars".to_string()),
        valid_keys: "prefix_window_chars".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `prefix_window_chars`"));

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("prefix_widow_chars"));
}
