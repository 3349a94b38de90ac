// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message processing jobs: debounce, supersede, defer, commit.
//!
//! Every message owns at most one slot. Scheduling new content for a message
//! cancels whatever job the slot currently holds and bumps the generation.
//! A job may only commit its result while it is still the slot's current
//! generation, its token is uncancelled and the scheduler is alive; all three
//! are checked under the slot lock, so a superseded job can never overwrite a
//! newer result.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use streamline_config::model::SchedulerConfig;
use streamline_core::error::StreamlineError;
use streamline_core::traits::{IdleScheduler, RenderAdapter};
use streamline_core::types::{MessageId, ProcessedContent, ProcessingOptions, ProcessingState};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::cache::ContentCache;
use crate::idle::run_when_idle;
use crate::recording;

/// Timing knobs for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Quiet period before a job runs.
    pub base_debounce: Duration,
    /// Content above this many characters is "large".
    pub sync_threshold_chars: usize,
    /// Debounce multiplier applied to large content.
    pub large_content_multiplier: u32,
    /// Upper bound on the idle wait for large content.
    pub idle_timeout: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

impl SchedulerSettings {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            base_debounce: config.base_debounce(),
            sync_threshold_chars: config.sync_threshold_chars,
            large_content_multiplier: config.large_content_multiplier.max(1),
            idle_timeout: config.idle_timeout(),
        }
    }

    pub fn is_large(&self, chars: usize) -> bool {
        chars > self.sync_threshold_chars
    }

    /// Debounce for content of `chars` characters.
    pub fn debounce_for(&self, chars: usize) -> Duration {
        if self.is_large(chars) {
            self.base_debounce * self.large_content_multiplier
        } else {
            self.base_debounce
        }
    }
}

struct Slot {
    generation: u64,
    /// Present while a job is pending or running.
    token: Option<CancellationToken>,
    state: watch::Sender<ProcessingState>,
}

impl Slot {
    fn new() -> Self {
        let (state, _) = watch::channel(ProcessingState::Idle);
        Self {
            generation: 0,
            token: None,
            state,
        }
    }
}

struct Job {
    message_id: MessageId,
    content: String,
    options: ProcessingOptions,
    generation: u64,
    token: CancellationToken,
}

struct Inner {
    renderer: Arc<dyn RenderAdapter>,
    idle: Arc<dyn IdleScheduler>,
    settings: SchedulerSettings,
    cache: ContentCache,
    slots: Mutex<HashMap<MessageId, Slot>>,
    next_generation: AtomicU64,
    alive: AtomicBool,
    root: CancellationToken,
}

impl Inner {
    fn slots(&self) -> MutexGuard<'_, HashMap<MessageId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(self: Arc<Self>, job: Job) {
        let chars = job.content.chars().count();
        let debounce = self.settings.debounce_for(chars);

        tokio::select! {
            biased;
            _ = job.token.cancelled() => return,
            _ = tokio::time::sleep(debounce) => {}
        }

        let large = self.settings.is_large(chars);
        let (renderer, content, options) = (&self.renderer, &job.content, &job.options);
        let render = move || async move {
            let started = Instant::now();
            let result = renderer.render(content, options).await;
            (result, started.elapsed())
        };
        let (result, elapsed) = tokio::select! {
            biased;
            _ = job.token.cancelled() => return,
            rendered = async {
                if large {
                    trace!(message_id = %job.message_id, chars, "deferring large content to idle time");
                    run_when_idle(self.idle.as_ref(), self.settings.idle_timeout, render).await
                } else {
                    render().await
                }
            } => rendered,
        };

        self.commit(job, result, elapsed);
    }

    fn commit(
        &self,
        job: Job,
        result: Result<ProcessedContent, StreamlineError>,
        elapsed: Duration,
    ) -> bool {
        let mut slots = self.slots();
        let current = slots
            .get_mut(&job.message_id)
            .filter(|slot| slot.generation == job.generation);

        let slot = match current {
            Some(slot) if !job.token.is_cancelled() && self.alive.load(Ordering::Acquire) => slot,
            _ => {
                recording::record_stale();
                debug!(
                    message_id = %job.message_id,
                    generation = job.generation,
                    "discarding stale processing result"
                );
                return false;
            }
        };

        slot.token = None;
        match result {
            Ok(processed) => {
                let processed = Arc::new(processed);
                self.cache.insert(
                    job.message_id.clone(),
                    job.content,
                    job.options,
                    Arc::clone(&processed),
                );
                slot.state.send_replace(ProcessingState::Done(processed));
                recording::record_completed();
                debug!(
                    message_id = %job.message_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "processed content committed"
                );
            }
            Err(e) => {
                slot.state.send_replace(ProcessingState::Error(e.to_string()));
                recording::record_failed();
                warn!(
                    message_id = %job.message_id,
                    error = %e,
                    "content processing failed, falling back to raw content"
                );
            }
        }
        true
    }
}

/// Debounced, cancellable scheduler of render jobs.
///
/// Cheap to clone; clones share the same slots and cache.
#[derive(Clone)]
pub struct ProcessingScheduler {
    inner: Arc<Inner>,
}

impl ProcessingScheduler {
    pub fn new(
        renderer: Arc<dyn RenderAdapter>,
        idle: Arc<dyn IdleScheduler>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                renderer,
                idle,
                settings,
                cache: ContentCache::new(),
                slots: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
                alive: AtomicBool::new(true),
                root: CancellationToken::new(),
            }),
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.inner.settings
    }

    pub fn cache(&self) -> &ContentCache {
        &self.inner.cache
    }

    /// Schedules processing of `content` for a message.
    ///
    /// Any job already pending for the message is cancelled. The returned
    /// receiver observes the message's processing state from now on. Must be
    /// called from within a tokio runtime.
    pub fn schedule(
        &self,
        message_id: MessageId,
        content: String,
        options: ProcessingOptions,
    ) -> watch::Receiver<ProcessingState> {
        if !self.inner.alive.load(Ordering::Acquire) {
            debug!(message_id = %message_id, "scheduler shut down, ignoring schedule");
            return watch::channel(ProcessingState::Idle).1;
        }

        let mut slots = self.inner.slots();
        let slot = slots.entry(message_id.clone()).or_insert_with(Slot::new);

        if let Some(previous) = slot.token.take() {
            previous.cancel();
            recording::record_superseded();
            debug!(message_id = %message_id, generation = slot.generation, "superseded pending job");
        }

        let receiver = slot.state.subscribe();
        slot.generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);

        if let Some(hit) = self.inner.cache.get(&message_id, &content, &options) {
            trace!(message_id = %message_id, "processed content served from cache");
            slot.state.send_replace(ProcessingState::Done(hit));
            return receiver;
        }

        let token = self.inner.root.child_token();
        slot.token = Some(token.clone());
        slot.state.send_replace(ProcessingState::Processing);
        let job = Job {
            message_id,
            content,
            options,
            generation: slot.generation,
            token,
        };
        drop(slots);

        recording::record_scheduled();
        tokio::spawn(Arc::clone(&self.inner).run(job));
        receiver
    }

    /// Renders immediately through the collaborator, bypassing debounce,
    /// slots and cache.
    pub async fn render_now(
        &self,
        content: &str,
        options: &ProcessingOptions,
    ) -> Result<ProcessedContent, StreamlineError> {
        self.inner.renderer.render(content, options).await
    }

    /// Current processing state of a message; `Idle` when unknown.
    pub fn state(&self, message_id: &MessageId) -> ProcessingState {
        self.inner
            .slots()
            .get(message_id)
            .map(|slot| slot.state.borrow().clone())
            .unwrap_or_default()
    }

    /// Subscribes to a message's processing state, if the message has a slot.
    pub fn subscribe(&self, message_id: &MessageId) -> Option<watch::Receiver<ProcessingState>> {
        self.inner
            .slots()
            .get(message_id)
            .map(|slot| slot.state.subscribe())
    }

    /// Cached result for exactly this `(message, content, options)` key.
    pub fn cached(
        &self,
        message_id: &MessageId,
        content: &str,
        options: &ProcessingOptions,
    ) -> Option<Arc<ProcessedContent>> {
        self.inner.cache.get(message_id, content, options)
    }

    /// Whether a job is pending or running for the message.
    pub fn in_flight(&self, message_id: &MessageId) -> bool {
        self.inner
            .slots()
            .get(message_id)
            .is_some_and(|slot| slot.token.is_some())
    }

    /// Cancels the pending job for a message and resets it to `Idle`.
    ///
    /// Used when the message starts streaming again; the cache entry is kept.
    pub fn cancel(&self, message_id: &MessageId) {
        let mut slots = self.inner.slots();
        if let Some(slot) = slots.get_mut(message_id) {
            if let Some(token) = slot.token.take() {
                token.cancel();
                debug!(message_id = %message_id, "cancelled pending job");
            }
            slot.state.send_replace(ProcessingState::Idle);
        }
    }

    /// Forgets a message entirely: cancels its job, drops its slot and
    /// cached content. Subscribers see their channel close.
    pub fn remove(&self, message_id: &MessageId) {
        let removed = self.inner.slots().remove(message_id);
        if let Some(token) = removed.and_then(|slot| slot.token) {
            token.cancel();
        }
        self.inner.cache.remove(message_id);
        debug!(message_id = %message_id, "removed message from scheduler");
    }

    /// Stops accepting work and cancels every pending job.
    pub fn shutdown(&self) {
        if !self.inner.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        self.inner.root.cancel();
        let mut slots = self.inner.slots();
        let pending = slots.values().filter(|slot| slot.token.is_some()).count();
        slots.clear();
        self.inner.cache.clear();
        debug!(pending, "processing scheduler shut down");
    }

    pub fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ProcessingScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingScheduler")
            .field("renderer", &self.inner.renderer.name())
            .field("settings", &self.inner.settings)
            .field("cached", &self.inner.cache.len())
            .finish()
    }
}
