// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content processing scheduler for the Streamline message pipeline.
//!
//! Owns at most one render job per message. Jobs are debounced, superseded
//! when content changes, deferred to idle time when large, and committed to
//! a shared [`ContentCache`] only while they are still current.

pub mod cache;
pub mod idle;
pub mod recording;
pub mod scheduler;

pub use cache::ContentCache;
pub use idle::{run_when_idle, wait_idle_or_ceiling};
pub use scheduler::{ProcessingScheduler, SchedulerSettings};
