// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only snapshot of a message as the UI should present it.

use std::sync::Arc;

use serde::Serialize;
use streamline_core::types::{
    MessageId, ProcessedContent, ProcessingState, Role, StreamingState,
};

/// Everything a message bubble renders from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub message_id: MessageId,
    pub role: Role,
    pub streaming_state: StreamingState,
    /// Content is still arriving; show the lightweight streaming render.
    pub is_streaming: bool,
    pub is_interrupted: bool,
    /// A recoverable stream matched and no recovery action is in flight.
    pub is_resumable: bool,
    pub can_discard: bool,
    /// A resume or discard is in flight.
    pub is_busy: bool,
    pub processing_state: ProcessingState,
    pub processed_content: Option<Arc<ProcessedContent>>,
    /// Content without the thinking block.
    pub visible_content: String,
    pub thinking: Option<String>,
    /// Render `visible_content` as plain text: oversized or failed processing.
    pub raw_fallback: bool,
    /// Last user-facing failure for this message.
    pub notice: Option<String>,
}

impl MessageView {
    /// A spinner is warranted only while a processing job is pending.
    pub fn shows_spinner(&self) -> bool {
        self.processing_state.is_processing()
    }
}
