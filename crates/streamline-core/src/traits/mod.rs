// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contracts for the external collaborators the pipeline depends on.
//!
//! Collaborators extend the [`CollaboratorAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod directory;
pub mod idle;
pub mod render;
pub mod transport;

pub use adapter::CollaboratorAdapter;
pub use directory::StreamDirectoryAdapter;
pub use idle::IdleScheduler;
pub use render::RenderAdapter;
pub use transport::TransportAdapter;
