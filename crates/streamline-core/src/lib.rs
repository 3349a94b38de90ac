// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Streamline message pipeline.
//!
//! This crate provides the shared types, the error type, and the contracts
//! for the external collaborators (renderer, transport, recoverable-stream
//! directory, idle scheduler) used throughout the Streamline workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StreamlineError;
pub use types::{
    AdapterType, ContentKind, HealthStatus, Message, MessageId, MessageMetadata,
    ProcessedContent, ProcessingOptions, ProcessingState, RecoverableStream, Role, StreamId,
    StreamingState, TransportEvent,
};

pub use traits::{
    CollaboratorAdapter, IdleScheduler, RenderAdapter, StreamDirectoryAdapter, TransportAdapter,
};
