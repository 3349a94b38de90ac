// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Streamline message pipeline.

use thiserror::Error;

use crate::types::{MessageId, StreamingState};

/// The primary error type used across collaborator traits and pipeline operations.
#[derive(Debug, Error)]
pub enum StreamlineError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The render/highlight collaborator rejected the content.
    #[error("render error: {message}")]
    Render {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The transport rejected a resume or discard request.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A resume or discard is already in flight for this message.
    #[error("recovery already in flight for message {message_id}")]
    ResumeInFlight { message_id: MessageId },

    /// No recoverable stream matched the interrupted message.
    #[error("no recoverable stream for message {message_id}")]
    NoRecoverableStream { message_id: MessageId },

    /// The requested lifecycle transition is not allowed from the current state.
    #[error("cannot {action} message {message_id} in state {state}")]
    InvalidTransition {
        message_id: MessageId,
        state: StreamingState,
        action: &'static str,
    },

    /// The message is not tracked by the pipeline.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StreamlineError {
    /// Convenience constructor for render failures without an underlying source.
    pub fn render(message: impl Into<String>) -> Self {
        StreamlineError::Render {
            message: message.into(),
            source: None,
        }
    }

    /// Convenience constructor for transport failures without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        StreamlineError::Transport {
            message: message.into(),
            source: None,
        }
    }
}
