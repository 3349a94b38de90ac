// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic content classification.
//!
//! Decides whether message text is worth handing to the render collaborator.
//! Assistant output is treated permissively (missing real markdown is worse
//! than an unnecessary render); user text needs unambiguous markers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use streamline_config::model::ClassifierConfig;
use streamline_core::types::{ContentKind, Role};
use tracing::warn;

/// Content longer than this many characters is never processed.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 10_000;

/// Characters that make markdown plausible in assistant output.
const PLAUSIBLE_MARKERS: &[char] = &['`', '#', '*', '_', '[', '>', '|', '~'];

/// Paired inline code on a single line.
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`\n]+`").unwrap());

/// ATX heading at the start of a line.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ {0,3}#{1,6}[ \t]+\S").unwrap());

/// Bulleted or numbered list item at the start of a line.
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*+]|\d{1,9}[.)])[ \t]+\S").unwrap());

/// Inline `[text](target)` link.
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]\n]+\]\([^)\s]+\)").unwrap());

/// Why content bypasses processing. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Content is still arriving; the lightweight streaming render is used.
    Streaming,
    /// Content exceeds the size ceiling; the cheapest render is used.
    Oversized { chars: usize, limit: usize },
    /// No formatting markers were found.
    NoMarkers,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Streaming => write!(f, "content is still streaming"),
            SkipReason::Oversized { chars, limit } => {
                write!(f, "content has {chars} characters, limit is {limit}")
            }
            SkipReason::NoMarkers => write!(f, "no formatting markers"),
        }
    }
}

/// Result of classifying a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether the content should be handed to the processing scheduler.
    pub requires_processing: bool,
    /// Informational kind, used for progress messaging only.
    pub kind: ContentKind,
    /// Set whenever `requires_processing` is false.
    pub skip: Option<SkipReason>,
}

impl Classification {
    fn process(kind: ContentKind) -> Self {
        Self {
            requires_processing: true,
            kind,
            skip: None,
        }
    }

    fn skip(reason: SkipReason, kind: ContentKind) -> Self {
        Self {
            requires_processing: false,
            kind,
            skip: Some(reason),
        }
    }

    /// True when the content was rejected for size and must use the cheapest render.
    pub fn is_oversized(&self) -> bool {
        matches!(self.skip, Some(SkipReason::Oversized { .. }))
    }
}

/// Classifies raw message text for processing.
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    max_content_chars: usize,
}

impl ContentClassifier {
    /// Create a classifier with the default size ceiling.
    pub fn new() -> Self {
        Self {
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }

    /// Create a classifier with a custom size ceiling.
    pub fn with_max_chars(max_content_chars: usize) -> Self {
        Self { max_content_chars }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::with_max_chars(config.max_content_chars)
    }

    pub fn max_content_chars(&self) -> usize {
        self.max_content_chars
    }

    /// Classify `content` written by `role`.
    ///
    /// Streaming content and content above the size ceiling never require
    /// processing, whatever their markers.
    pub fn classify(&self, content: &str, role: Role, is_streaming: bool) -> Classification {
        if is_streaming {
            return Classification::skip(SkipReason::Streaming, ContentKind::None);
        }

        // Byte length bounds the char count from above.
        if content.len() > self.max_content_chars {
            let chars = content.chars().count();
            if chars > self.max_content_chars {
                warn!(
                    chars,
                    limit = self.max_content_chars,
                    role = %role,
                    "content exceeds processing ceiling, falling back to raw render"
                );
                return Classification::skip(
                    SkipReason::Oversized {
                        chars,
                        limit: self.max_content_chars,
                    },
                    ContentKind::None,
                );
            }
        }

        let kind = Self::strict_kind(content);
        if kind != ContentKind::None {
            return Classification::process(kind);
        }

        if role == Role::Assistant && content.contains(PLAUSIBLE_MARKERS) {
            return Classification::process(ContentKind::Markdown);
        }

        Classification::skip(SkipReason::NoMarkers, ContentKind::None)
    }

    /// Kind derived from unambiguous markers only.
    fn strict_kind(content: &str) -> ContentKind {
        if content.contains("```") || content.contains("~~~") {
            ContentKind::Code
        } else if INLINE_CODE.is_match(content) {
            ContentKind::InlineCode
        } else if HEADING.is_match(content) || LIST_ITEM.is_match(content) || LINK.is_match(content)
        {
            ContentKind::Markdown
        } else {
            ContentKind::None
        }
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_never_requires_processing() {
        let c = ContentClassifier::new();
        let result = c.classify("```rust\nfn main() {}\n```", Role::Assistant, true);
        assert!(!result.requires_processing);
        assert_eq!(result.skip, Some(SkipReason::Streaming));
    }

    #[test]
    fn fenced_code_is_code() {
        let c = ContentClassifier::new();
        let result = c.classify("look:\n```\nlet x = 1;\n```", Role::User, false);
        assert!(result.requires_processing);
        assert_eq!(result.kind, ContentKind::Code);
    }

    #[test]
    fn paired_backticks_are_inline_code() {
        let c = ContentClassifier::new();
        let result = c.classify("run `cargo fmt` first", Role::User, false);
        assert!(result.requires_processing);
        assert_eq!(result.kind, ContentKind::InlineCode);
    }

    #[test]
    fn user_plain_text_is_skipped() {
        let c = ContentClassifier::new();
        let result = c.classify("what's the weather like today?", Role::User, false);
        assert!(!result.requires_processing);
        assert_eq!(result.skip, Some(SkipReason::NoMarkers));
    }

    #[test]
    fn user_stray_asterisk_is_not_markdown() {
        let c = ContentClassifier::new();
        let result = c.classify("5 * 3 is 15 and I'm #1", Role::User, false);
        assert!(!result.requires_processing);
    }

    #[test]
    fn assistant_stray_asterisk_is_processed() {
        let c = ContentClassifier::new();
        let result = c.classify("this is *probably* emphasis", Role::Assistant, false);
        assert!(result.requires_processing);
        assert_eq!(result.kind, ContentKind::Markdown);
    }

    #[test]
    fn user_heading_list_and_link_qualify() {
        let c = ContentClassifier::new();
        for text in [
            "## Notes\nsomething",
            "todo:\n- milk\n- eggs",
            "1. first\n2. second",
            "see [docs](https://example.com)",
        ] {
            let result = c.classify(text, Role::User, false);
            assert!(result.requires_processing, "{text:?} should qualify");
            assert_eq!(result.kind, ContentKind::Markdown);
        }
    }

    #[test]
    fn system_role_uses_strict_rules() {
        let c = ContentClassifier::new();
        assert!(!c.classify("a * b", Role::System, false).requires_processing);
    }

    #[test]
    fn oversized_content_is_skipped_for_any_role() {
        let c = ContentClassifier::new();
        let text = format!("# Title\n```\n{}\n```", "x".repeat(15_000));
        for role in [Role::User, Role::Assistant] {
            let result = c.classify(&text, role, false);
            assert!(!result.requires_processing);
            assert!(result.is_oversized());
        }
    }

    #[test]
    fn ceiling_counts_characters_not_bytes() {
        let c = ContentClassifier::with_max_chars(10);
        // 7 chars, 17 bytes.
        let text = "`日本語日本`";
        assert!(c.classify(text, Role::User, false).requires_processing);
    }

    #[test]
    fn empty_content_is_skipped() {
        let c = ContentClassifier::new();
        assert!(!c.classify("", Role::Assistant, false).requires_processing);
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(
            SkipReason::Oversized {
                chars: 12,
                limit: 10
            }
            .to_string(),
            "content has 12 characters, limit is 10"
        );
        assert_eq!(SkipReason::Streaming.to_string(), "content is still streaming");
    }

    #[tracing_test::traced_test]
    #[test]
    fn oversized_content_logs_a_warning() {
        let text = "a".repeat(64);
        let result = ContentClassifier::with_max_chars(32).classify(&text, Role::Assistant, false);
        assert!(result.is_oversized());
        assert!(logs_contain("content exceeds processing ceiling"));
    }
}
