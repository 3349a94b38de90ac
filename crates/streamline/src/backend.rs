// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline collaborators used when replaying a recorded session.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use streamline_core::error::StreamlineError;
use streamline_core::traits::{CollaboratorAdapter, StreamDirectoryAdapter, TransportAdapter};
use streamline_core::types::{AdapterType, RecoverableStream, StreamId};
use tracing::info;

/// Directory serving a fixed set of recoverable streams.
///
/// Streams released through [`NoopTransport`] disappear from later listings.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    streams: Mutex<Vec<RecoverableStream>>,
}

impl StaticDirectory {
    pub fn new(streams: Vec<RecoverableStream>) -> Self {
        Self {
            streams: Mutex::new(streams),
        }
    }

    fn release(&self, stream_id: &StreamId) {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|s| &s.stream_id != stream_id);
    }
}

#[async_trait]
impl CollaboratorAdapter for StaticDirectory {
    fn name(&self) -> &str {
        "static-directory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::StreamDirectory
    }
}

#[async_trait]
impl StreamDirectoryAdapter for StaticDirectory {
    async fn list_recoverable(&self) -> Result<Vec<RecoverableStream>, StreamlineError> {
        Ok(self
            .streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

/// Transport that accepts every request without a backend.
#[derive(Debug)]
pub struct NoopTransport {
    directory: Arc<StaticDirectory>,
}

impl NoopTransport {
    pub fn new(directory: Arc<StaticDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl CollaboratorAdapter for NoopTransport {
    fn name(&self) -> &str {
        "noop-transport"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }
}

#[async_trait]
impl TransportAdapter for NoopTransport {
    async fn resume_stream(&self, stream_id: &StreamId) -> Result<(), StreamlineError> {
        info!(stream_id = %stream_id, "replay: resume accepted");
        self.directory.release(stream_id);
        Ok(())
    }

    async fn discard_stream(&self, stream_id: &StreamId) -> Result<(), StreamlineError> {
        info!(stream_id = %stream_id, "replay: discard accepted");
        self.directory.release(stream_id);
        Ok(())
    }
}
