// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the classifier, scheduler, lifecycle, and pipeline crates.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Prefix carried by client-generated ids that the server has not confirmed yet.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Unique identifier for a message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Mints a fresh client-side id pending server confirmation.
    pub fn temporary() -> Self {
        Self(format!("{TEMP_ID_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    /// Returns `true` for ids minted client-side and not yet confirmed.
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier of a recoverable generation stream tracked by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(pub String);

impl StreamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Author of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Where a message is in its generation lifecycle.
///
/// Only `Streaming` is non-terminal. `Interrupted` may go back to
/// `Streaming` through an explicit, successful resume.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StreamingState {
    Streaming,
    Complete,
    Interrupted,
    Errored,
}

impl StreamingState {
    /// Content of a settled message never mutates again.
    pub fn is_settled(self) -> bool {
        matches!(self, StreamingState::Complete | StreamingState::Errored)
    }
}

/// Optional bookkeeping attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageMetadata {
    pub processing_time_ms: Option<u64>,
    pub provider_id: Option<String>,
    pub model_id: Option<String>,
    pub regenerated: bool,
    pub error: bool,
}

/// A chat message as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub streaming_state: StreamingState,
    #[serde(default)]
    pub metadata: MessageMetadata,
}

impl Message {
    /// A settled message with the given role and content.
    pub fn complete(id: impl Into<MessageId>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            streaming_state: StreamingState::Complete,
            metadata: MessageMetadata::default(),
        }
    }

    /// An empty assistant message about to receive streamed chunks.
    pub fn streaming_assistant(id: impl Into<MessageId>) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: String::new(),
            streaming_state: StreamingState::Streaming,
            metadata: MessageMetadata::default(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Informational discrimination of what kind of formatting a text carries.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    #[default]
    None,
    InlineCode,
    Code,
    Markdown,
}

/// Options forwarded to the render collaborator. Part of the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessingOptions {
    pub kind: ContentKind,
    pub show_line_numbers: bool,
    pub max_height: Option<u32>,
    pub allow_html: bool,
}

/// Rendered artifact produced by the render collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedContent {
    /// Rendered HTML.
    pub html: String,
    /// Classification the content was rendered with.
    pub kind: ContentKind,
    /// Number of fenced code blocks found while rendering.
    pub code_blocks: usize,
}

/// Observable processing state for a single message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ProcessingState {
    #[default]
    Idle,
    Processing,
    Done(Arc<ProcessedContent>),
    Error(String),
}

impl ProcessingState {
    pub fn is_processing(&self) -> bool {
        matches!(self, ProcessingState::Processing)
    }

    pub fn processed(&self) -> Option<&Arc<ProcessedContent>> {
        match self {
            ProcessingState::Done(content) => Some(content),
            _ => None,
        }
    }
}

/// Backend record of an interrupted generation that may be resumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableStream {
    pub stream_id: StreamId,
    #[serde(default)]
    pub message_id: Option<MessageId>,
    /// Generated text at the moment of interruption.
    pub last_content: String,
    /// Generation progress, 0-100.
    #[serde(default)]
    pub progress: u8,
    pub updated_at: DateTime<Utc>,
}

/// Event emitted by the transport for a streaming message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportEvent {
    Chunk { message_id: MessageId, text: String },
    Complete { message_id: MessageId },
    Error { message_id: MessageId, message: String },
}

impl TransportEvent {
    pub fn message_id(&self) -> &MessageId {
        match self {
            TransportEvent::Chunk { message_id, .. }
            | TransportEvent::Complete { message_id }
            | TransportEvent::Error { message_id, .. } => message_id,
        }
    }
}

/// Health status reported by collaborator health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Collaborator is fully operational.
    Healthy,
    /// Collaborator is operational but experiencing issues.
    Degraded(String),
    /// Collaborator is not operational.
    Unhealthy(String),
}

/// Identifies which external collaborator an adapter stands in for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Renderer,
    Transport,
    StreamDirectory,
}
