// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline harness for end-to-end tests.
//!
//! `PipelineHarness` assembles a [`MessagePipeline`] over mock collaborators
//! and keeps handles on every mock so tests can script and inspect them.

use std::sync::Arc;
use std::time::Duration;

use streamline_config::model::StreamlineConfig;
use streamline_core::types::{Message, MessageId, ProcessingState, RecoverableStream, TransportEvent};
use streamline_pipeline::{Collaborators, MessagePipeline};

use crate::manual_idle::ManualIdle;
use crate::mock_renderer::MockRenderer;
use crate::mock_transport::{MockDirectory, MockTransport};

/// Builder for [`PipelineHarness`].
pub struct PipelineHarnessBuilder {
    config: StreamlineConfig,
    streams: Vec<RecoverableStream>,
    render_delay: Duration,
}

impl PipelineHarnessBuilder {
    fn new() -> Self {
        Self {
            config: StreamlineConfig::default(),
            streams: Vec::new(),
            render_delay: Duration::ZERO,
        }
    }

    /// Use a custom configuration.
    pub fn with_config(mut self, config: StreamlineConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the recoverable-stream directory.
    pub fn with_streams(mut self, streams: Vec<RecoverableStream>) -> Self {
        self.streams = streams;
        self
    }

    /// Every render takes `delay`.
    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Override the resume/discard timeout.
    pub fn with_resume_timeout(mut self, timeout: Duration) -> Self {
        self.config.recovery.resume_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn build(self) -> PipelineHarness {
        let renderer = Arc::new(MockRenderer::with_delay(self.render_delay));
        let transport = Arc::new(MockTransport::new());
        let directory = Arc::new(MockDirectory::with_streams(self.streams));
        let idle = Arc::new(ManualIdle::new());

        let pipeline = MessagePipeline::new(
            &self.config,
            Collaborators {
                renderer: renderer.clone(),
                transport: transport.clone(),
                directory: directory.clone(),
                idle: idle.clone(),
            },
        );

        PipelineHarness {
            pipeline: Arc::new(pipeline),
            renderer,
            transport,
            directory,
            idle,
        }
    }
}

/// A pipeline wired to mock collaborators.
pub struct PipelineHarness {
    pub pipeline: Arc<MessagePipeline>,
    pub renderer: Arc<MockRenderer>,
    pub transport: Arc<MockTransport>,
    pub directory: Arc<MockDirectory>,
    pub idle: Arc<ManualIdle>,
}

impl PipelineHarness {
    pub fn builder() -> PipelineHarnessBuilder {
        PipelineHarnessBuilder::new()
    }

    /// Starts a live assistant message and streams `chunks` into it.
    pub fn stream_assistant(&self, id: &str, chunks: &[&str]) -> MessageId {
        let message_id = MessageId::from(id);
        self.pipeline.track(Message::streaming_assistant(id));
        for chunk in chunks {
            // The message was tracked just above.
            let _ = self.pipeline.handle_event(TransportEvent::Chunk {
                message_id: message_id.clone(),
                text: (*chunk).to_string(),
            });
        }
        message_id
    }

    /// Waits until the message's processing state leaves `Processing`.
    ///
    /// Returns the current state when the message has no processing slot.
    pub async fn settled(&self, message_id: &MessageId) -> ProcessingState {
        let Some(mut rx) = self.pipeline.subscribe(message_id) else {
            return ProcessingState::Idle;
        };
        match rx.wait_for(|state| !state.is_processing()).await {
            Ok(state) => state.clone(),
            Err(_) => ProcessingState::Idle,
        }
    }
}
