// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `replay`: drive a pipeline from a recorded script and print the views.
//!
//! A script lists messages (live or restored from history), the recoverable
//! streams the directory knows about, and the steps to apply in order.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use streamline_config::StreamlineConfig;
use streamline_core::error::StreamlineError;
use streamline_core::traits::idle::YieldIdle;
use streamline_core::types::{Message, MessageId, RecoverableStream, TransportEvent};
use streamline_pipeline::{Collaborators, MessagePipeline, MessageView};
use streamline_render::ComrakRenderer;
use tracing::{debug, warn};

use crate::backend::{NoopTransport, StaticDirectory};
use crate::input::{print_json, read_json};

/// Upper bound on waiting for pending processing once the steps are done.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    /// Messages with a live transport session.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Messages loaded from history.
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub streams: Vec<RecoverableStream>,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStep {
    Event(TransportEvent),
    TransportLost(MessageId),
    Resume(MessageId),
    Discard(MessageId),
    /// Pause for this many milliseconds.
    Wait(u64),
}

#[derive(Debug, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepOutcome {
    fn from_result<T: std::fmt::Display>(step: usize, result: Result<T, StreamlineError>) -> Self {
        match result {
            Ok(value) => Self {
                step,
                ok: true,
                detail: Some(value.to_string()).filter(|s| !s.is_empty()),
            },
            Err(e) => Self {
                step,
                ok: false,
                detail: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub outcomes: Vec<StepOutcome>,
    pub views: Vec<MessageView>,
}

/// Runs a script against a pipeline backed by the comrak renderer.
pub async fn replay(
    config: &StreamlineConfig,
    script: ReplayScript,
) -> Result<ReplayReport, StreamlineError> {
    let directory = Arc::new(StaticDirectory::new(script.streams));
    let pipeline = MessagePipeline::new(
        config,
        Collaborators {
            renderer: Arc::new(ComrakRenderer::new()),
            transport: Arc::new(NoopTransport::new(directory.clone())),
            directory,
            idle: Arc::new(YieldIdle),
        },
    );

    for message in script.messages {
        pipeline.track(message);
    }
    for message in script.history {
        pipeline.restore(message);
    }
    if let Err(e) = pipeline.refresh_recoverable().await {
        warn!(error = %e, "replay: initial recoverable snapshot failed");
    }

    let mut outcomes = Vec::with_capacity(script.steps.len());
    for (step, action) in script.steps.into_iter().enumerate() {
        debug!(step, action = ?action, "replay step");
        let outcome = match action {
            ReplayStep::Event(event) => {
                StepOutcome::from_result(step, pipeline.handle_event(event).map(|()| ""))
            }
            ReplayStep::TransportLost(id) => StepOutcome::from_result(
                step,
                pipeline
                    .mark_transport_lost(&id)
                    .map(|interrupted| if interrupted { "interrupted" } else { "" }),
            ),
            ReplayStep::Resume(id) => StepOutcome::from_result(step, pipeline.resume(&id).await),
            ReplayStep::Discard(id) => StepOutcome::from_result(step, pipeline.discard(&id).await),
            ReplayStep::Wait(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                StepOutcome::from_result(step, Ok(""))
            }
        };
        outcomes.push(outcome);
    }

    let ids = pipeline.message_ids();
    let pending = ids.iter().filter_map(|id| pipeline.subscribe(id)).map(|mut rx| async move {
        let _ = rx.wait_for(|state| !state.is_processing()).await;
    });
    if tokio::time::timeout(SETTLE_TIMEOUT, futures::future::join_all(pending))
        .await
        .is_err()
    {
        warn!("replay: processing did not settle in time");
    }

    let views = ids.iter().filter_map(|id| pipeline.view(id)).collect();
    pipeline.shutdown();
    Ok(ReplayReport { outcomes, views })
}

pub async fn run_replay(
    config: &StreamlineConfig,
    path: Option<&Path>,
) -> Result<(), StreamlineError> {
    let script: ReplayScript = read_json(path)?;
    let report = replay(config, script).await?;
    print_json(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamline_core::types::ProcessingState;

    fn script(json: &str) -> ReplayScript {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn completed_markdown_is_rendered() {
        let script = script(
            r##"{
                "messages": [{"id": "m1", "role": "assistant", "content": "", "streaming_state": "streaming"}],
                "steps": [
                    {"event": {"type": "chunk", "message_id": "m1", "text": "# Title\n"}},
                    {"event": {"type": "chunk", "message_id": "m1", "text": "- item"}},
                    {"event": {"type": "complete", "message_id": "m1"}}
                ]
            }"##,
        );

        let report = replay(&StreamlineConfig::default(), script).await.unwrap();
        assert!(report.outcomes.iter().all(|o| o.ok));
        let view = &report.views[0];
        assert!(matches!(view.processing_state, ProcessingState::Done(_)));
        let html = &view.processed_content.as_ref().unwrap().html;
        assert!(html.contains("<h1>Title</h1>"));
    }

    #[tokio::test]
    async fn interrupted_message_is_resumed_from_matching_stream() {
        let script = script(
            r#"{
                "messages": [{"id": "temp-1", "role": "assistant", "content": "The answer is", "streaming_state": "streaming"}],
                "streams": [
                    {"stream_id": "s-old", "last_content": "The answer", "updated_at": "2026-03-01T10:00:00Z"},
                    {"stream_id": "s-new", "last_content": "The answer is 4", "updated_at": "2026-03-01T10:05:00Z"}
                ],
                "steps": [
                    {"transport_lost": "temp-1"},
                    {"resume": "temp-1"},
                    {"resume": "temp-1"}
                ]
            }"#,
        );

        let report = replay(&StreamlineConfig::default(), script).await.unwrap();
        assert_eq!(report.outcomes[0].detail.as_deref(), Some("interrupted"));
        assert_eq!(report.outcomes[1].detail.as_deref(), Some("s-new"));
        assert!(!report.outcomes[2].ok);
        assert!(report.views[0].is_streaming);
    }

    #[test]
    fn unknown_script_fields_are_rejected() {
        let result: Result<ReplayScript, _> = serde_json::from_str(r#"{"mesages": []}"#);
        assert!(result.is_err());
    }
}
