// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message lifecycle records and the transitions allowed between them.
//!
//! ```text
//! Streaming ──end──────────▶ Complete
//!     │ ───transport error─▶ Errored
//!     └──session lost──────▶ Interrupted ──resume ok──▶ Streaming
//!                                 └───────discard ok──▶ (discarded, stays Interrupted)
//! ```
//!
//! A record is locked by its busy flag while a resume or discard is in
//! flight; no other recovery action is accepted until it clears.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use streamline_core::error::StreamlineError;
use streamline_core::types::{Message, MessageId, StreamingState};
use strum::Display;
use thiserror::Error;
use tracing::debug;

/// Recovery action currently holding a message's busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecoveryAction {
    Resuming,
    Discarding,
}

/// Explicit lifecycle state of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LifecycleRecord {
    pub state: StreamingState,
    pub busy: Option<RecoveryAction>,
    /// The recoverable stream for this message was released.
    pub discarded: bool,
}

impl LifecycleRecord {
    pub fn new(state: StreamingState) -> Self {
        Self {
            state,
            busy: None,
            discarded: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    /// Interrupted, not discarded and not locked by another action.
    pub fn accepts_recovery(&self) -> bool {
        self.state == StreamingState::Interrupted && !self.discarded && self.busy.is_none()
    }
}

/// Rejected lifecycle transition. Content is never touched when one occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {action} message {message_id} in state {state}")]
    InvalidTransition {
        message_id: MessageId,
        state: StreamingState,
        action: &'static str,
    },

    #[error("message {message_id} is busy {action}")]
    Busy {
        message_id: MessageId,
        action: RecoveryAction,
    },

    #[error("recoverable stream for message {message_id} was already discarded")]
    Discarded { message_id: MessageId },

    #[error("unknown message {0}")]
    UnknownMessage(MessageId),
}

impl From<TransitionError> for StreamlineError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition {
                message_id,
                state,
                action,
            } => StreamlineError::InvalidTransition {
                message_id,
                state,
                action,
            },
            TransitionError::Busy { message_id, .. } => {
                StreamlineError::ResumeInFlight { message_id }
            }
            TransitionError::Discarded { message_id } => {
                StreamlineError::NoRecoverableStream { message_id }
            }
            TransitionError::UnknownMessage(message_id) => {
                StreamlineError::MessageNotFound(message_id)
            }
        }
    }
}

/// Whether a message should be presented as interrupted.
///
/// An assistant message that is neither complete nor errored, is not being
/// streamed right now and carries no error flag.
pub fn is_interrupted(message: &Message, actively_streaming: bool) -> bool {
    message.is_assistant()
        && !message.streaming_state.is_settled()
        && !actively_streaming
        && !message.metadata.error
}

/// Owner of every tracked message's lifecycle record.
#[derive(Debug, Default)]
pub struct LifecycleRegistry {
    records: Mutex<HashMap<MessageId, LifecycleRecord>>,
}

impl LifecycleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<MessageId, LifecycleRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts tracking a message. An existing record is replaced.
    pub fn track(&self, message_id: MessageId, state: StreamingState) {
        debug!(message_id = %message_id, state = %state, "tracking message lifecycle");
        self.records().insert(message_id, LifecycleRecord::new(state));
    }

    pub fn record(&self, message_id: &MessageId) -> Option<LifecycleRecord> {
        self.records().get(message_id).copied()
    }

    pub fn state(&self, message_id: &MessageId) -> Option<StreamingState> {
        self.record(message_id).map(|record| record.state)
    }

    pub fn remove(&self, message_id: &MessageId) -> Option<LifecycleRecord> {
        self.records().remove(message_id)
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn update<T>(
        &self,
        message_id: &MessageId,
        apply: impl FnOnce(&mut LifecycleRecord) -> Result<T, TransitionError>,
    ) -> Result<T, TransitionError> {
        let mut records = self.records();
        let record = records
            .get_mut(message_id)
            .ok_or_else(|| TransitionError::UnknownMessage(message_id.clone()))?;
        apply(record)
    }

    fn settle(
        &self,
        message_id: &MessageId,
        target: StreamingState,
        action: &'static str,
    ) -> Result<(), TransitionError> {
        self.update(message_id, |record| {
            if record.state != StreamingState::Streaming {
                return Err(TransitionError::InvalidTransition {
                    message_id: message_id.clone(),
                    state: record.state,
                    action,
                });
            }
            record.state = target;
            debug!(message_id = %message_id, from = "streaming", to = %target, "lifecycle transition");
            Ok(())
        })
    }

    /// Streaming → Complete on a clean end of stream.
    pub fn complete(&self, message_id: &MessageId) -> Result<(), TransitionError> {
        self.settle(message_id, StreamingState::Complete, "complete")
    }

    /// Streaming → Errored on a transport failure.
    pub fn fail(&self, message_id: &MessageId) -> Result<(), TransitionError> {
        self.settle(message_id, StreamingState::Errored, "fail")
    }

    /// Streaming → Interrupted when the transport session is gone.
    pub fn interrupt(&self, message_id: &MessageId) -> Result<(), TransitionError> {
        self.settle(message_id, StreamingState::Interrupted, "interrupt")
    }

    /// Sets the busy flag for `action`. Only an interrupted, undiscarded,
    /// idle record is accepted.
    pub fn begin(&self, message_id: &MessageId, action: RecoveryAction) -> Result<(), TransitionError> {
        self.update(message_id, |record| {
            if let Some(current) = record.busy {
                return Err(TransitionError::Busy {
                    message_id: message_id.clone(),
                    action: current,
                });
            }
            if record.discarded {
                return Err(TransitionError::Discarded {
                    message_id: message_id.clone(),
                });
            }
            if record.state != StreamingState::Interrupted {
                return Err(TransitionError::InvalidTransition {
                    message_id: message_id.clone(),
                    state: record.state,
                    action: match action {
                        RecoveryAction::Resuming => "resume",
                        RecoveryAction::Discarding => "discard",
                    },
                });
            }
            record.busy = Some(action);
            debug!(message_id = %message_id, action = %action, "recovery started");
            Ok(())
        })
    }

    /// Clears the busy flag set by [`begin`](Self::begin) and applies the
    /// outcome. A failed action leaves the record interrupted.
    pub fn finish(&self, message_id: &MessageId, action: RecoveryAction, succeeded: bool) {
        let mut records = self.records();
        let Some(record) = records.get_mut(message_id) else {
            return;
        };
        if record.busy != Some(action) {
            return;
        }
        record.busy = None;
        if succeeded {
            match action {
                RecoveryAction::Resuming => record.state = StreamingState::Streaming,
                RecoveryAction::Discarding => record.discarded = true,
            }
        }
        debug!(message_id = %message_id, action = %action, succeeded, state = %record.state, "recovery finished");
    }
}
