// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recoverable-stream directory contract.

use async_trait::async_trait;

use crate::error::StreamlineError;
use crate::traits::adapter::CollaboratorAdapter;
use crate::types::RecoverableStream;

/// Read-only view of the backend's recoverable stream records.
#[async_trait]
pub trait StreamDirectoryAdapter: CollaboratorAdapter {
    /// Returns the current snapshot of recoverable streams.
    async fn list_recoverable(&self) -> Result<Vec<RecoverableStream>, StreamlineError>;
}
