// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resume and discard of interrupted messages.
//!
//! Each action takes the message's busy flag before calling the transport
//! and releases it through a guard, so the flag clears on success, failure,
//! timeout and when the caller drops the future mid-flight.

use std::sync::Arc;
use std::time::Duration;

use streamline_config::model::RecoveryConfig;
use streamline_core::error::StreamlineError;
use streamline_core::traits::TransportAdapter;
use streamline_core::types::{MessageId, StreamId};
use tracing::{info, warn};

use crate::recording;
use crate::state::{LifecycleRegistry, RecoveryAction};

/// Default bound on a single resume or discard call.
pub const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Holds a message's busy flag; releases it on drop.
struct BusyGuard<'a> {
    registry: &'a LifecycleRegistry,
    message_id: &'a MessageId,
    action: RecoveryAction,
    succeeded: bool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(
        registry: &'a LifecycleRegistry,
        message_id: &'a MessageId,
        action: RecoveryAction,
    ) -> Result<Self, StreamlineError> {
        registry.begin(message_id, action)?;
        Ok(Self {
            registry,
            message_id,
            action,
            succeeded: false,
        })
    }

    fn succeed(mut self) {
        self.succeeded = true;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.registry
            .finish(self.message_id, self.action, self.succeeded);
    }
}

fn outcome_label(result: &Result<(), StreamlineError>) -> &'static str {
    match result {
        Ok(()) => "success",
        Err(StreamlineError::Timeout { .. }) => "timeout",
        Err(_) => "failure",
    }
}

/// Runs resume and discard requests against the transport.
pub struct RecoveryCoordinator {
    registry: Arc<LifecycleRegistry>,
    transport: Arc<dyn TransportAdapter>,
    timeout: Duration,
}

impl RecoveryCoordinator {
    pub fn new(
        registry: Arc<LifecycleRegistry>,
        transport: Arc<dyn TransportAdapter>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            transport,
            timeout,
        }
    }

    pub fn from_config(
        registry: Arc<LifecycleRegistry>,
        transport: Arc<dyn TransportAdapter>,
        config: &RecoveryConfig,
    ) -> Self {
        Self::new(registry, transport, config.resume_timeout())
    }

    pub fn registry(&self) -> &Arc<LifecycleRegistry> {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resumes the interrupted message from `stream_id`.
    ///
    /// At most one resume or discard runs per message. On success the message
    /// is streaming again; on any failure it stays interrupted.
    pub async fn resume(
        &self,
        message_id: &MessageId,
        stream_id: &StreamId,
    ) -> Result<(), StreamlineError> {
        let guard = match BusyGuard::acquire(&self.registry, message_id, RecoveryAction::Resuming) {
            Ok(guard) => guard,
            Err(e) => {
                recording::record_resume("rejected");
                return Err(e);
            }
        };

        let result = self
            .call(self.transport.resume_stream(stream_id))
            .await;
        recording::record_resume(outcome_label(&result));

        match &result {
            Ok(()) => {
                guard.succeed();
                info!(message_id = %message_id, stream_id = %stream_id, "stream resumed");
            }
            Err(e) => {
                drop(guard);
                warn!(message_id = %message_id, stream_id = %stream_id, error = %e, "resume failed");
            }
        }
        result
    }

    /// Releases the recoverable stream for the message. Content is untouched
    /// and the message stays interrupted.
    pub async fn discard(
        &self,
        message_id: &MessageId,
        stream_id: &StreamId,
    ) -> Result<(), StreamlineError> {
        let guard =
            match BusyGuard::acquire(&self.registry, message_id, RecoveryAction::Discarding) {
                Ok(guard) => guard,
                Err(e) => {
                    recording::record_discard("rejected");
                    return Err(e);
                }
            };

        let result = self
            .call(self.transport.discard_stream(stream_id))
            .await;
        recording::record_discard(outcome_label(&result));

        match &result {
            Ok(()) => {
                guard.succeed();
                info!(message_id = %message_id, stream_id = %stream_id, "recoverable stream discarded");
            }
            Err(e) => {
                drop(guard);
                warn!(message_id = %message_id, stream_id = %stream_id, error = %e, "discard failed");
            }
        }
        result
    }

    async fn call(
        &self,
        request: impl std::future::Future<Output = Result<(), StreamlineError>>,
    ) -> Result<(), StreamlineError> {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(StreamlineError::Timeout {
                duration: self.timeout,
            }),
        }
    }
}

impl std::fmt::Debug for RecoveryCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryCoordinator")
            .field("transport", &self.transport.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
