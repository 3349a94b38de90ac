// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic render collaborator.
//!
//! `MockRenderer` wraps content in a predictable HTML shell, can be told to
//! stall or fail on specific content, and records every call it sees.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use streamline_core::error::StreamlineError;
use streamline_core::traits::{CollaboratorAdapter, RenderAdapter};
use streamline_core::types::{AdapterType, ProcessedContent, ProcessingOptions};

#[derive(Default)]
struct Script {
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    failures: Vec<String>,
    calls: Vec<String>,
    completed: Vec<String>,
}

/// A render collaborator with scripted latency and failures.
#[derive(Default)]
pub struct MockRenderer {
    script: Mutex<Script>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every render takes `delay`.
    pub fn with_delay(delay: Duration) -> Self {
        let renderer = Self::new();
        renderer.lock().default_delay = delay;
        renderer
    }

    /// Rendering exactly `content` takes `delay`.
    pub fn set_delay(&self, content: &str, delay: Duration) {
        self.lock().delays.insert(content.to_string(), delay);
    }

    /// Rendering any content containing `needle` fails.
    pub fn fail_on(&self, needle: &str) {
        self.lock().failures.push(needle.to_string());
    }

    /// Contents of every render call, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Contents whose render call ran to completion.
    pub fn completed(&self) -> Vec<String> {
        self.lock().completed.clone()
    }

    /// The HTML this renderer produces for `text`.
    pub fn html_for(text: &str) -> String {
        format!("<div class=\"mock\">{text}</div>")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl CollaboratorAdapter for MockRenderer {
    fn name(&self) -> &str {
        "mock-renderer"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Renderer
    }
}

#[async_trait]
impl RenderAdapter for MockRenderer {
    async fn render(
        &self,
        text: &str,
        options: &ProcessingOptions,
    ) -> Result<ProcessedContent, StreamlineError> {
        let (delay, fails) = {
            let mut script = self.lock();
            script.calls.push(text.to_string());
            let delay = script
                .delays
                .get(text)
                .copied()
                .unwrap_or(script.default_delay);
            let fails = script.failures.iter().any(|needle| text.contains(needle.as_str()));
            (delay, fails)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.lock().completed.push(text.to_string());

        if fails {
            return Err(StreamlineError::render(format!(
                "mock render failure for {text:?}"
            )));
        }

        Ok(ProcessedContent {
            html: Self::html_for(text),
            kind: options.kind,
            code_blocks: text.matches("```").count() / 2,
        })
    }
}
