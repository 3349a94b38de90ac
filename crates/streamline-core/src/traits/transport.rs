// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport collaborator contract.
//!
//! Chunk and terminal events travel the other way, as
//! [`TransportEvent`](crate::types::TransportEvent) values fed to the pipeline.

use async_trait::async_trait;

use crate::error::StreamlineError;
use crate::traits::adapter::CollaboratorAdapter;
use crate::types::StreamId;

#[async_trait]
pub trait TransportAdapter: CollaboratorAdapter {
    /// Asks the backend to continue an interrupted generation.
    async fn resume_stream(&self, stream_id: &StreamId) -> Result<(), StreamlineError>;

    /// Releases a recoverable stream record. There is no undo.
    async fn discard_stream(&self, stream_id: &StreamId) -> Result<(), StreamlineError>;
}
