// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming message lifecycle pipeline.
//!
//! [`MessagePipeline`] takes transport events in and hands out
//! [`MessageView`] snapshots, offering `resume` and `discard` for messages
//! whose generation was interrupted.

pub mod pipeline;
pub mod view;

pub use pipeline::{Collaborators, MessagePipeline};
pub use view::MessageView;
