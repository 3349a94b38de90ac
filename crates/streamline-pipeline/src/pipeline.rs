// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-message pipeline.
//!
//! Transport events drive the lifecycle; settled content is split into
//! visible text and thinking, classified, and handed to the processing
//! scheduler. Interrupted messages are matched against the latest snapshot
//! of recoverable streams to decide whether resume or discard is offered.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use streamline_config::model::{RenderConfig, StreamlineConfig};
use streamline_content::{extract, ContentClassifier, SkipReason};
use streamline_core::error::StreamlineError;
use streamline_core::traits::{
    IdleScheduler, RenderAdapter, StreamDirectoryAdapter, TransportAdapter,
};
use streamline_core::types::{
    Message, MessageId, ProcessingState, RecoverableStream, StreamId, StreamingState,
    TransportEvent,
};
use streamline_lifecycle::{
    is_interrupted, LifecycleRegistry, MatchOutcome, RecoverableStreamMatcher,
    RecoveryCoordinator,
};
use streamline_scheduler::{ProcessingScheduler, SchedulerSettings};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// External collaborators the pipeline drives.
#[derive(Clone)]
pub struct Collaborators {
    pub renderer: Arc<dyn RenderAdapter>,
    pub transport: Arc<dyn TransportAdapter>,
    pub directory: Arc<dyn StreamDirectoryAdapter>,
    pub idle: Arc<dyn IdleScheduler>,
}

struct Entry {
    message: Message,
    /// A transport session is currently feeding this message.
    actively_streaming: bool,
    skip: Option<SkipReason>,
    notice: Option<String>,
}

/// Facade over classifier, scheduler, lifecycle and recovery for a conversation.
pub struct MessagePipeline {
    classifier: ContentClassifier,
    matcher: RecoverableStreamMatcher,
    scheduler: ProcessingScheduler,
    registry: Arc<LifecycleRegistry>,
    recovery: RecoveryCoordinator,
    directory: Arc<dyn StreamDirectoryAdapter>,
    render: RenderConfig,
    entries: Mutex<HashMap<MessageId, Entry>>,
    streams: Mutex<Vec<RecoverableStream>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MessagePipeline {
    pub fn new(config: &StreamlineConfig, collaborators: Collaborators) -> Self {
        let registry = Arc::new(LifecycleRegistry::new());
        Self {
            classifier: ContentClassifier::from_config(&config.classifier),
            matcher: RecoverableStreamMatcher::from_config(&config.matcher),
            scheduler: ProcessingScheduler::new(
                collaborators.renderer,
                collaborators.idle,
                SchedulerSettings::from_config(&config.scheduler),
            ),
            recovery: RecoveryCoordinator::from_config(
                Arc::clone(&registry),
                collaborators.transport,
                &config.recovery,
            ),
            registry,
            directory: collaborators.directory,
            render: config.render.clone(),
            entries: Mutex::new(HashMap::new()),
            streams: Mutex::new(Vec::new()),
        }
    }

    pub fn scheduler(&self) -> &ProcessingScheduler {
        &self.scheduler
    }

    pub fn registry(&self) -> &Arc<LifecycleRegistry> {
        &self.registry
    }

    /// Registers a live message. A streaming message is assumed to have a
    /// transport session feeding it unless it already carries the error
    /// flag, in which case it is registered as errored. Anything not
    /// streaming is processed immediately.
    pub fn track(&self, mut message: Message) {
        if message.streaming_state == StreamingState::Streaming && message.metadata.error {
            warn!(message_id = %message.id, "tracked streaming message already carries an error flag");
            message.streaming_state = StreamingState::Errored;
        }
        let actively_streaming = message.streaming_state == StreamingState::Streaming;
        self.insert(message, actively_streaming);
    }

    /// Registers a message loaded from history. No session feeds it, so an
    /// unsettled assistant message comes back interrupted.
    pub fn restore(&self, mut message: Message) {
        if message.streaming_state == StreamingState::Streaming {
            message.streaming_state = if is_interrupted(&message, false) {
                StreamingState::Interrupted
            } else if message.metadata.error {
                StreamingState::Errored
            } else {
                StreamingState::Complete
            };
        }
        self.insert(message, false);
    }

    fn insert(&self, message: Message, actively_streaming: bool) {
        let id = message.id.clone();
        self.registry.track(id.clone(), message.streaming_state);
        let streaming = message.streaming_state == StreamingState::Streaming;
        lock(&self.entries).insert(
            id.clone(),
            Entry {
                message,
                actively_streaming,
                skip: None,
                notice: None,
            },
        );
        if !streaming {
            self.process(&id);
        }
    }

    /// Classifies the message's visible content and schedules processing when
    /// it qualifies.
    fn process(&self, message_id: &MessageId) {
        let mut entries = lock(&self.entries);
        let Some(entry) = entries.get_mut(message_id) else {
            return;
        };
        let message = &entry.message;
        let visible = extract(&message.content, message.role).visible;
        let is_streaming = message.streaming_state == StreamingState::Streaming;
        let classification = self.classifier.classify(&visible, message.role, is_streaming);
        entry.skip = classification.skip;

        if classification.requires_processing {
            let options = self.render.options_for(classification.kind);
            debug!(message_id = %message_id, kind = %classification.kind, "scheduling content processing");
            self.scheduler.schedule(message_id.clone(), visible, options);
        } else {
            self.scheduler.cancel(message_id);
        }
    }

    /// Applies one transport event.
    ///
    /// Chunks for a message that is not streaming are ignored with a warning.
    pub fn handle_event(&self, event: TransportEvent) -> Result<(), StreamlineError> {
        let message_id = event.message_id().clone();
        if !lock(&self.entries).contains_key(&message_id) {
            return Err(StreamlineError::MessageNotFound(message_id));
        }

        match event {
            TransportEvent::Chunk { text, .. } => {
                let mut entries = lock(&self.entries);
                let Some(entry) = entries.get_mut(&message_id) else {
                    return Err(StreamlineError::MessageNotFound(message_id));
                };
                if self.registry.state(&message_id) != Some(StreamingState::Streaming) {
                    warn!(
                        message_id = %message_id,
                        state = %entry.message.streaming_state,
                        "ignoring chunk for a message that is not streaming"
                    );
                    return Ok(());
                }
                entry.message.content.push_str(&text);
                entry.actively_streaming = true;
            }
            TransportEvent::Complete { .. } => {
                self.registry.complete(&message_id)?;
                self.update(&message_id, |entry| {
                    entry.message.streaming_state = StreamingState::Complete;
                    entry.actively_streaming = false;
                });
                debug!(message_id = %message_id, "message complete");
                self.process(&message_id);
            }
            TransportEvent::Error { message, .. } => {
                self.registry.fail(&message_id)?;
                self.update(&message_id, |entry| {
                    entry.message.streaming_state = StreamingState::Errored;
                    entry.message.metadata.error = true;
                    entry.actively_streaming = false;
                    entry.notice = Some(message.clone());
                });
                warn!(message_id = %message_id, error = %message, "message generation failed");
                self.process(&message_id);
            }
        }
        Ok(())
    }

    /// Reports the transport session for a message as gone.
    ///
    /// Returns whether the message is now interrupted.
    pub fn mark_transport_lost(&self, message_id: &MessageId) -> Result<bool, StreamlineError> {
        let interrupted = {
            let mut entries = lock(&self.entries);
            let entry = entries
                .get_mut(message_id)
                .ok_or_else(|| StreamlineError::MessageNotFound(message_id.clone()))?;
            entry.actively_streaming = false;
            if !is_interrupted(&entry.message, false)
                || entry.message.streaming_state != StreamingState::Streaming
            {
                false
            } else {
                self.registry.interrupt(message_id)?;
                entry.message.streaming_state = StreamingState::Interrupted;
                true
            }
        };
        if interrupted {
            info!(message_id = %message_id, "message interrupted");
            self.process(message_id);
        }
        Ok(interrupted)
    }

    /// Replaces the recoverable-stream snapshot from the directory.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn refresh_recoverable(&self) -> Result<usize, StreamlineError> {
        match self.directory.list_recoverable().await {
            Ok(streams) => {
                let count = streams.len();
                *lock(&self.streams) = streams;
                debug!(count, "recoverable stream snapshot refreshed");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "could not list recoverable streams");
                Err(e)
            }
        }
    }

    /// Current recoverable-stream snapshot.
    pub fn recoverable_streams(&self) -> Vec<RecoverableStream> {
        lock(&self.streams).clone()
    }

    fn assess(&self, message: &Message) -> MatchOutcome {
        self.matcher.assess(message, &lock(&self.streams))
    }

    /// Snapshot of how the message should be presented.
    pub fn view(&self, message_id: &MessageId) -> Option<crate::view::MessageView> {
        let (message, actively_streaming, skip, notice) = {
            let entries = lock(&self.entries);
            let entry = entries.get(message_id)?;
            (
                entry.message.clone(),
                entry.actively_streaming,
                entry.skip,
                entry.notice.clone(),
            )
        };
        let record = self.registry.record(message_id)?;
        let is_interrupted = record.state == StreamingState::Interrupted;
        let outcome = if is_interrupted {
            self.assess(&message)
        } else {
            MatchOutcome::default()
        };
        let processing_state = self.scheduler.state(message_id);
        let extraction = extract(&message.content, message.role);
        let raw_fallback = matches!(skip, Some(SkipReason::Oversized { .. }))
            || matches!(processing_state, ProcessingState::Error(_));

        Some(crate::view::MessageView {
            message_id: message.id.clone(),
            role: message.role,
            streaming_state: record.state,
            is_streaming: record.state == StreamingState::Streaming && actively_streaming,
            is_interrupted,
            is_resumable: record.accepts_recovery() && outcome.is_resumable(),
            can_discard: record.accepts_recovery() && outcome.can_discard(),
            is_busy: record.is_busy(),
            processed_content: processing_state.processed().cloned(),
            processing_state,
            visible_content: extraction.visible,
            thinking: extraction.thinking,
            raw_fallback,
            notice,
        })
    }

    /// Current copy of a tracked message.
    pub fn message(&self, message_id: &MessageId) -> Option<Message> {
        lock(&self.entries)
            .get(message_id)
            .map(|entry| entry.message.clone())
    }

    /// Ids of every tracked message, sorted.
    pub fn message_ids(&self) -> Vec<MessageId> {
        let mut ids: Vec<MessageId> = lock(&self.entries).keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Observes the processing state of a message.
    pub fn subscribe(&self, message_id: &MessageId) -> Option<watch::Receiver<ProcessingState>> {
        self.scheduler.subscribe(message_id)
    }

    /// Finds the stream to act on against a fresh directory snapshot.
    async fn target_stream(
        &self,
        message_id: &MessageId,
        allow_discard_only: bool,
    ) -> Result<StreamId, StreamlineError> {
        let record = self
            .registry
            .record(message_id)
            .ok_or_else(|| StreamlineError::MessageNotFound(message_id.clone()))?;
        if record.is_busy() {
            return Err(StreamlineError::ResumeInFlight {
                message_id: message_id.clone(),
            });
        }

        self.refresh_recoverable().await?;
        let message = self
            .message(message_id)
            .ok_or_else(|| StreamlineError::MessageNotFound(message_id.clone()))?;
        let outcome = self.assess(&message);

        let stream = match outcome.matched {
            Some(found) => Some(found.stream),
            None if allow_discard_only => outcome.discard_only.into_iter().next(),
            None => None,
        };
        stream
            .map(|s| s.stream_id)
            .ok_or_else(|| StreamlineError::NoRecoverableStream {
                message_id: message_id.clone(),
            })
    }

    /// Resumes an interrupted message from its matched recoverable stream.
    ///
    /// Failures are kept as the message's notice and returned.
    pub async fn resume(&self, message_id: &MessageId) -> Result<StreamId, StreamlineError> {
        let result = match self.target_stream(message_id, false).await {
            Ok(stream_id) => self
                .recovery
                .resume(message_id, &stream_id)
                .await
                .map(|()| stream_id),
            Err(e) => Err(e),
        };

        match &result {
            Ok(stream_id) => {
                self.scheduler.cancel(message_id);
                self.update(message_id, |entry| {
                    entry.message.streaming_state = StreamingState::Streaming;
                    entry.actively_streaming = true;
                    entry.notice = None;
                });
                self.forget_stream(stream_id);
            }
            Err(e) => self.set_notice(message_id, e),
        }
        result
    }

    /// Releases the recoverable stream for an interrupted message. The
    /// message content stays as it is.
    pub async fn discard(&self, message_id: &MessageId) -> Result<StreamId, StreamlineError> {
        let result = match self.target_stream(message_id, true).await {
            Ok(stream_id) => self
                .recovery
                .discard(message_id, &stream_id)
                .await
                .map(|()| stream_id),
            Err(e) => Err(e),
        };

        match &result {
            Ok(stream_id) => {
                self.update(message_id, |entry| entry.notice = None);
                self.forget_stream(stream_id);
            }
            Err(e) => self.set_notice(message_id, e),
        }
        result
    }

    /// Stops tracking a message and cancels its pending work.
    pub fn remove(&self, message_id: &MessageId) -> bool {
        self.scheduler.remove(message_id);
        self.registry.remove(message_id);
        let removed = lock(&self.entries).remove(message_id).is_some();
        if removed {
            debug!(message_id = %message_id, "message removed from pipeline");
        }
        removed
    }

    /// Cancels all pending processing. Views remain readable.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        info!("message pipeline shut down");
    }

    fn update(&self, message_id: &MessageId, apply: impl FnOnce(&mut Entry)) {
        if let Some(entry) = lock(&self.entries).get_mut(message_id) {
            apply(entry);
        }
    }

    fn set_notice(&self, message_id: &MessageId, error: &StreamlineError) {
        self.update(message_id, |entry| entry.notice = Some(error.to_string()));
    }

    fn forget_stream(&self, stream_id: &StreamId) {
        lock(&self.streams).retain(|s| &s.stream_id != stream_id);
    }
}

impl std::fmt::Debug for MessagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePipeline")
            .field("messages", &lock(&self.entries).len())
            .field("scheduler", &self.scheduler)
            .field("recovery", &self.recovery)
            .finish()
    }
}
