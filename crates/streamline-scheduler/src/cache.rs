// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message cache of processed content.
//!
//! Holds the latest committed result for each message together with the
//! `(content, options)` key it was produced from. Reads are lock-free from
//! any task; writes only happen from the scheduler's commit step.

use std::sync::Arc;

use dashmap::DashMap;
use streamline_core::types::{MessageId, ProcessedContent, ProcessingOptions};

#[derive(Debug)]
struct CacheEntry {
    content: String,
    options: ProcessingOptions,
    processed: Arc<ProcessedContent>,
}

/// Latest processed content per message.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: DashMap<MessageId, CacheEntry>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result when it was produced from exactly this key.
    pub fn get(
        &self,
        message_id: &MessageId,
        content: &str,
        options: &ProcessingOptions,
    ) -> Option<Arc<ProcessedContent>> {
        self.entries
            .get(message_id)
            .filter(|entry| entry.content == content && entry.options == *options)
            .map(|entry| Arc::clone(&entry.processed))
    }

    /// Returns the most recent result for the message, whatever its key.
    pub fn latest(&self, message_id: &MessageId) -> Option<Arc<ProcessedContent>> {
        self.entries
            .get(message_id)
            .map(|entry| Arc::clone(&entry.processed))
    }

    pub(crate) fn insert(
        &self,
        message_id: MessageId,
        content: String,
        options: ProcessingOptions,
        processed: Arc<ProcessedContent>,
    ) {
        self.entries.insert(
            message_id,
            CacheEntry {
                content,
                options,
                processed,
            },
        );
    }

    pub(crate) fn remove(&self, message_id: &MessageId) {
        self.entries.remove(message_id);
    }

    pub(crate) fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
