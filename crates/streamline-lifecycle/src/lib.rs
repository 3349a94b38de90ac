// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message lifecycle for the Streamline pipeline.
//!
//! - [`state`]: the per-message state machine and its registry
//! - [`matcher`]: pairing interrupted messages with recoverable streams
//! - [`recovery`]: resume and discard guarded by the per-message busy flag

pub mod matcher;
pub mod recording;
pub mod recovery;
pub mod state;

pub use matcher::{MatchKind, MatchOutcome, RecoverableStreamMatcher, StreamMatch};
pub use recovery::RecoveryCoordinator;
pub use state::{
    is_interrupted, LifecycleRecord, LifecycleRegistry, RecoveryAction, TransitionError,
};
