// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `classify`, `extract` and `match`: one-shot inspection commands.

use std::path::Path;

use serde::{Deserialize, Serialize};
use streamline_config::StreamlineConfig;
use streamline_content::{extract, Classification, ContentClassifier};
use streamline_core::error::StreamlineError;
use streamline_core::types::{ContentKind, Message, RecoverableStream, Role};
use streamline_lifecycle::{MatchOutcome, RecoverableStreamMatcher};

use crate::input::{print_json, read_json, read_text};

#[derive(Debug, Serialize)]
pub struct ClassifyReport {
    pub requires_processing: bool,
    pub kind: ContentKind,
    pub skip: Option<String>,
    pub chars: usize,
}

impl ClassifyReport {
    fn new(classification: Classification, content: &str) -> Self {
        Self {
            requires_processing: classification.requires_processing,
            kind: classification.kind,
            skip: classification.skip.map(|reason| reason.to_string()),
            chars: content.chars().count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractReport {
    pub visible: String,
    pub thinking: Option<String>,
}

/// Input document for `match`.
#[derive(Debug, Deserialize)]
pub struct MatchInput {
    pub message: Message,
    #[serde(default)]
    pub streams: Vec<RecoverableStream>,
}

pub fn classify(
    config: &StreamlineConfig,
    content: &str,
    role: Role,
    streaming: bool,
) -> ClassifyReport {
    let classifier = ContentClassifier::from_config(&config.classifier);
    ClassifyReport::new(classifier.classify(content, role, streaming), content)
}

pub fn run_classify(
    config: &StreamlineConfig,
    path: Option<&Path>,
    role: Role,
    streaming: bool,
) -> Result<(), StreamlineError> {
    let content = read_text(path)?;
    print_json(&classify(config, &content, role, streaming))
}

pub fn run_extract(path: Option<&Path>, role: Role) -> Result<(), StreamlineError> {
    let content = read_text(path)?;
    let extraction = extract(&content, role);
    print_json(&ExtractReport {
        visible: extraction.visible,
        thinking: extraction.thinking,
    })
}

pub fn assess(config: &StreamlineConfig, input: &MatchInput) -> MatchOutcome {
    RecoverableStreamMatcher::from_config(&config.matcher).assess(&input.message, &input.streams)
}

pub fn run_match(config: &StreamlineConfig, path: Option<&Path>) -> Result<(), StreamlineError> {
    let input: MatchInput = read_json(path)?;
    print_json(&assess(config, &input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_report_names_skip_reason() {
        let report = classify(&StreamlineConfig::default(), "hello there", Role::User, false);
        assert!(!report.requires_processing);
        assert_eq!(report.skip.as_deref(), Some("no formatting markers"));
        assert_eq!(report.chars, 11);
    }

    #[test]
    fn match_input_parses_and_assesses() {
        let input: MatchInput = serde_json::from_str(
            r#"{
                "message": {
                    "id": "temp-1",
                    "role": "assistant",
                    "content": "The answer is",
                    "streaming_state": "interrupted"
                },
                "streams": [{
                    "stream_id": "s1",
                    "message_id": null,
                    "last_content": "The answer is 4",
                    "progress": 80,
                    "updated_at": "2026-03-01T10:05:00Z"
                }]
            }"#,
        )
        .unwrap();

        let outcome = assess(&StreamlineConfig::default(), &input);
        assert_eq!(
            outcome.matched.map(|m| m.stream.stream_id.0),
            Some("s1".to_string())
        );
    }
}
