// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splits assistant output into visible text and a reasoning ("thinking") block.
//!
//! Two notations are recognised, in priority order:
//! 1. a fenced block labelled `thinking` or `thought` (a newline must follow the label)
//! 2. a `<think>...</think>` or `<thinking>...</thinking>` tag pair
//!
//! Only the first match supplies the thinking text. Any further recognised
//! blocks are removed from the visible text so extraction is idempotent.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use streamline_core::types::Role;

static FENCED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```[ \t]*(?:thinking|thought)[ \t]*\r?\n(.*?)```").unwrap()
});

static TAGGED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<think>(.*?)</think>|<thinking>(.*?)</thinking>").unwrap()
});

/// Result of splitting a message into visible content and reasoning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkingExtraction {
    pub visible: String,
    pub thinking: Option<String>,
}

impl ThinkingExtraction {
    fn unchanged(content: &str) -> Self {
        Self {
            visible: content.to_string(),
            thinking: None,
        }
    }
}

struct Block {
    span: Range<usize>,
    inner: Range<usize>,
}

fn find_block(text: &str) -> Option<Block> {
    if let Some(caps) = FENCED.captures(text) {
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        return Some(Block {
            span: whole.range(),
            inner: inner.range(),
        });
    }

    let caps = TAGGED.captures(text)?;
    let whole = caps.get(0)?;
    let inner = caps.get(1).or_else(|| caps.get(2))?;
    Some(Block {
        span: whole.range(),
        inner: inner.range(),
    })
}

fn splice_out(text: &str, span: Range<usize>) -> String {
    let mut out = String::with_capacity(text.len() - span.len());
    out.push_str(&text[..span.start]);
    out.push_str(&text[span.end..]);
    out
}

/// Extracts the thinking block from assistant content.
///
/// Non-assistant roles, blank content and content without a recognised
/// block are returned unchanged with `thinking: None`.
pub fn extract(content: &str, role: Role) -> ThinkingExtraction {
    if role != Role::Assistant || content.trim().is_empty() {
        return ThinkingExtraction::unchanged(content);
    }

    let Some(first) = find_block(content) else {
        return ThinkingExtraction::unchanged(content);
    };

    let thinking = content[first.inner].trim();
    let thinking = (!thinking.is_empty()).then(|| thinking.to_string());

    let mut visible = splice_out(content, first.span);
    while let Some(next) = find_block(&visible) {
        visible = splice_out(&visible, next.span);
    }

    ThinkingExtraction {
        visible: visible.trim().to_string(),
        thinking,
    }
}
