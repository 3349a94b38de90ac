// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every external collaborator.

use async_trait::async_trait;

use crate::error::StreamlineError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for collaborator adapters (renderer, transport, directory).
#[async_trait]
pub trait CollaboratorAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns which collaborator this adapter stands in for.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, StreamlineError> {
        Ok(HealthStatus::Healthy)
    }
}
