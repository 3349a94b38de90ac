// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Markdown to HTML rendering with comrak.
//!
//! GitHub-flavoured extensions are enabled. Raw HTML in the source is
//! omitted unless the options allow it.

use async_trait::async_trait;
use comrak::{markdown_to_html, Options};
use streamline_core::error::StreamlineError;
use streamline_core::traits::{CollaboratorAdapter, RenderAdapter};
use streamline_core::types::{AdapterType, ProcessedContent, ProcessingOptions};
use tracing::trace;

/// Render collaborator producing HTML from Markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComrakRenderer;

impl ComrakRenderer {
    pub fn new() -> Self {
        Self
    }

    fn comrak_options(options: &ProcessingOptions) -> Options<'static> {
        let mut comrak = Options::default();
        comrak.extension.strikethrough = true;
        comrak.extension.table = true;
        comrak.extension.autolink = true;
        comrak.extension.tasklist = true;
        comrak.render.r#unsafe = options.allow_html;
        comrak
    }

    /// Renders synchronously. Pure function of its arguments.
    pub fn render_html(&self, text: &str, options: &ProcessingOptions) -> ProcessedContent {
        let html = markdown_to_html(text, &Self::comrak_options(options));
        let code_blocks = html.matches("<pre").count();
        ProcessedContent {
            html: decorate_code_blocks(html, options),
            kind: options.kind,
            code_blocks,
        }
    }
}

/// Applies line-number and height options to every `<pre>` element.
fn decorate_code_blocks(html: String, options: &ProcessingOptions) -> String {
    let mut attributes = String::new();
    if options.show_line_numbers {
        attributes.push_str(" class=\"line-numbers\"");
    }
    if let Some(height) = options.max_height {
        attributes.push_str(&format!(" style=\"max-height: {height}px; overflow: auto\""));
    }
    if attributes.is_empty() {
        return html;
    }
    html.replace("<pre>", &format!("<pre{attributes}>"))
}

#[async_trait]
impl CollaboratorAdapter for ComrakRenderer {
    fn name(&self) -> &str {
        "comrak"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Renderer
    }
}

#[async_trait]
impl RenderAdapter for ComrakRenderer {
    async fn render(
        &self,
        text: &str,
        options: &ProcessingOptions,
    ) -> Result<ProcessedContent, StreamlineError> {
        let processed = self.render_html(text, options);
        trace!(
            chars = text.len(),
            code_blocks = processed.code_blocks,
            "rendered markdown"
        );
        Ok(processed)
    }
}
