// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Render/highlight collaborator contract.

use async_trait::async_trait;

use crate::error::StreamlineError;
use crate::traits::adapter::CollaboratorAdapter;
use crate::types::{ProcessedContent, ProcessingOptions};

/// Turns raw message text into a [`ProcessedContent`].
///
/// Implementations must be pure with respect to `(text, options)`: two calls
/// with identical inputs yield equal output. Rendering may fail; callers fall
/// back to showing the raw text.
#[async_trait]
pub trait RenderAdapter: CollaboratorAdapter {
    async fn render(
        &self,
        text: &str,
        options: &ProcessingOptions,
    ) -> Result<ProcessedContent, StreamlineError>;
}
