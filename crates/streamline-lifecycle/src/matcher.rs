// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pairs an interrupted message with the recoverable stream to resume.
//!
//! Streams bound to the message's id win outright. Otherwise a stream whose
//! leading text lines up with the message content is accepted. Ties go to the
//! most recently updated stream, then to the smallest stream id, so the
//! answer never depends on the order the directory returned the records in.

use std::cmp::Ordering;

use serde::Serialize;
use streamline_config::model::MatcherConfig;
use streamline_core::types::{Message, RecoverableStream, StreamingState};
use strum::Display;
use tracing::{debug, warn};

/// Characters of `last_content` compared against the message content.
pub const DEFAULT_PREFIX_WINDOW_CHARS: usize = 100;

/// How a stream was paired with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// `stream.message_id` equals the message id.
    Exact,
    /// Leading text of the stream and the message agree.
    Prefix,
}

/// The stream chosen for a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamMatch {
    pub stream: RecoverableStream,
    pub kind: MatchKind,
    /// Streams that qualified at the same level, the winner included.
    pub contenders: usize,
}

/// Everything the UI needs to offer resume or discard for a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    pub matched: Option<StreamMatch>,
    /// Unbound streams that did not match; they may be discarded but are
    /// never resumed into this message.
    pub discard_only: Vec<RecoverableStream>,
}

impl MatchOutcome {
    pub fn is_resumable(&self) -> bool {
        self.matched.is_some()
    }

    pub fn can_discard(&self) -> bool {
        self.matched.is_some() || !self.discard_only.is_empty()
    }
}

/// Most recent first, then smallest stream id. Duplicate records of one
/// stream fall back to their content so the order stays total.
fn precedence(a: &RecoverableStream, b: &RecoverableStream) -> Ordering {
    b.updated_at
        .cmp(&a.updated_at)
        .then_with(|| a.stream_id.cmp(&b.stream_id))
        .then_with(|| a.last_content.cmp(&b.last_content))
        .then_with(|| a.message_id.cmp(&b.message_id))
        .then_with(|| a.progress.cmp(&b.progress))
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[derive(Debug, Clone)]
pub struct RecoverableStreamMatcher {
    prefix_window_chars: usize,
}

impl RecoverableStreamMatcher {
    pub fn new() -> Self {
        Self::with_prefix_window(DEFAULT_PREFIX_WINDOW_CHARS)
    }

    pub fn with_prefix_window(prefix_window_chars: usize) -> Self {
        Self {
            prefix_window_chars,
        }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::with_prefix_window(config.prefix_window_chars)
    }

    pub fn prefix_window_chars(&self) -> usize {
        self.prefix_window_chars
    }

    /// Whether the stream's leading text and the message content agree.
    ///
    /// `last_content` is cut to the prefix window; either text may be the
    /// prefix of the other. Empty text on either side never qualifies.
    pub fn prefix_matches(&self, message_content: &str, stream: &RecoverableStream) -> bool {
        let window = truncate_chars(&stream.last_content, self.prefix_window_chars);
        if window.is_empty() || message_content.is_empty() {
            return false;
        }
        message_content.starts_with(window) || window.starts_with(message_content)
    }

    /// Finds the single stream to resume `message` with.
    ///
    /// Returns `None` unless the message is interrupted.
    pub fn find_match(&self, message: &Message, streams: &[RecoverableStream]) -> Option<StreamMatch> {
        if message.streaming_state != StreamingState::Interrupted {
            return None;
        }

        let mut exact: Vec<&RecoverableStream> = streams
            .iter()
            .filter(|s| s.message_id.as_ref() == Some(&message.id))
            .collect();
        if !exact.is_empty() {
            exact.sort_by(|a, b| precedence(a, b));
            if exact.len() > 1 {
                warn!(
                    message_id = %message.id,
                    count = exact.len(),
                    chosen = %exact[0].stream_id,
                    "several recoverable streams claim the same message, using the most recent"
                );
            }
            return Some(StreamMatch {
                stream: exact[0].clone(),
                kind: MatchKind::Exact,
                contenders: exact.len(),
            });
        }

        let mut prefixed: Vec<&RecoverableStream> = streams
            .iter()
            .filter(|s| self.prefix_matches(&message.content, s))
            .collect();
        prefixed.sort_by(|a, b| precedence(a, b));

        let winner = prefixed.first()?;
        debug!(
            message_id = %message.id,
            stream_id = %winner.stream_id,
            contenders = prefixed.len(),
            "recoverable stream matched by content prefix"
        );
        Some(StreamMatch {
            stream: (*winner).clone(),
            kind: MatchKind::Prefix,
            contenders: prefixed.len(),
        })
    }

    /// Finds the stream to resume plus the unbound streams offered for discard.
    pub fn assess(&self, message: &Message, streams: &[RecoverableStream]) -> MatchOutcome {
        if message.streaming_state != StreamingState::Interrupted {
            return MatchOutcome::default();
        }

        let matched = self.find_match(message, streams);
        let chosen = matched.as_ref().map(|m| &m.stream.stream_id);
        let mut discard_only: Vec<RecoverableStream> = streams
            .iter()
            .filter(|s| s.message_id.is_none() && Some(&s.stream_id) != chosen)
            .cloned()
            .collect();
        discard_only.sort_by(precedence);

        MatchOutcome {
            matched,
            discard_only,
        }
    }
}

impl Default for RecoverableStreamMatcher {
    fn default() -> Self {
        Self::new()
    }
}
