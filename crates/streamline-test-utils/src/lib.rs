// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Streamline integration tests.
//!
//! Provides mock collaborators and a pipeline harness for fast,
//! deterministic tests on paused tokio time.
//!
//! # Components
//!
//! - [`MockRenderer`] - render collaborator with scripted latency and failures
//! - [`MockTransport`] - counts resume/discard calls, can stall or fail them
//! - [`MockDirectory`] - in-memory recoverable-stream directory
//! - [`ManualIdle`] - idle signal released by the test
//! - [`PipelineHarness`] - a `MessagePipeline` wired to all of the above

pub mod harness;
pub mod manual_idle;
pub mod mock_renderer;
pub mod mock_transport;

pub use harness::{PipelineHarness, PipelineHarnessBuilder};
pub use manual_idle::ManualIdle;
pub use mock_renderer::MockRenderer;
pub use mock_transport::{recoverable, MockDirectory, MockTransport};
