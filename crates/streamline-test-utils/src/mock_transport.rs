// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport and directory collaborators for recovery tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use streamline_core::error::StreamlineError;
use streamline_core::traits::{CollaboratorAdapter, StreamDirectoryAdapter, TransportAdapter};
use streamline_core::types::{AdapterType, MessageId, RecoverableStream, StreamId};

/// Counts resume and discard calls; can stall or fail them.
#[derive(Default)]
pub struct MockTransport {
    delay: Mutex<Duration>,
    fail_resume: AtomicBool,
    fail_discard: AtomicBool,
    resumes: AtomicUsize,
    discards: AtomicUsize,
    resumed: Mutex<Vec<StreamId>>,
    discarded: Mutex<Vec<StreamId>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call takes `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = delay;
    }

    pub fn fail_resume(&self, fail: bool) {
        self.fail_resume.store(fail, Ordering::SeqCst);
    }

    pub fn fail_discard(&self, fail: bool) {
        self.fail_discard.store(fail, Ordering::SeqCst);
    }

    /// Number of resume calls that reached the transport.
    pub fn resume_calls(&self) -> usize {
        self.resumes.load(Ordering::SeqCst)
    }

    pub fn discard_calls(&self) -> usize {
        self.discards.load(Ordering::SeqCst)
    }

    /// Streams resumed successfully.
    pub fn resumed(&self) -> Vec<StreamId> {
        self.resumed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Streams discarded successfully.
    pub fn discarded(&self) -> Vec<StreamId> {
        self.discarded
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    async fn answer(
        &self,
        stream_id: &StreamId,
        fail: &AtomicBool,
        log: &Mutex<Vec<StreamId>>,
        verb: &str,
    ) -> Result<(), StreamlineError> {
        let delay = *self.delay.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fail.load(Ordering::SeqCst) {
            return Err(StreamlineError::transport(format!(
                "mock transport refused to {verb} {stream_id}"
            )));
        }
        log.lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(stream_id.clone());
        Ok(())
    }
}

#[async_trait]
impl CollaboratorAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }
}

#[async_trait]
impl TransportAdapter for MockTransport {
    async fn resume_stream(&self, stream_id: &StreamId) -> Result<(), StreamlineError> {
        self.resumes.fetch_add(1, Ordering::SeqCst);
        self.answer(stream_id, &self.fail_resume, &self.resumed, "resume")
            .await
    }

    async fn discard_stream(&self, stream_id: &StreamId) -> Result<(), StreamlineError> {
        self.discards.fetch_add(1, Ordering::SeqCst);
        self.answer(stream_id, &self.fail_discard, &self.discarded, "discard")
            .await
    }
}

/// Recoverable-stream directory backed by an in-memory list.
#[derive(Default)]
pub struct MockDirectory {
    streams: Mutex<Vec<RecoverableStream>>,
    unavailable: AtomicBool,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_streams(streams: Vec<RecoverableStream>) -> Self {
        let directory = Self::new();
        directory.set_streams(streams);
        directory
    }

    pub fn set_streams(&self, streams: Vec<RecoverableStream>) {
        *self.lock() = streams;
    }

    pub fn push(&self, stream: RecoverableStream) {
        self.lock().push(stream);
    }

    /// Makes `list_recoverable` fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RecoverableStream>> {
        self.streams
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl CollaboratorAdapter for MockDirectory {
    fn name(&self) -> &str {
        "mock-directory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::StreamDirectory
    }
}

#[async_trait]
impl StreamDirectoryAdapter for MockDirectory {
    async fn list_recoverable(&self) -> Result<Vec<RecoverableStream>, StreamlineError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StreamlineError::transport("mock directory unavailable"));
        }
        Ok(self.lock().clone())
    }
}

/// Builds a recoverable stream record updated `minute` minutes past 10:00 UTC
/// on a fixed day.
pub fn recoverable(
    stream_id: &str,
    message_id: Option<&str>,
    last_content: &str,
    minute: u32,
) -> RecoverableStream {
    use chrono::TimeZone;

    RecoverableStream {
        stream_id: StreamId::from(stream_id),
        message_id: message_id.map(MessageId::from),
        last_content: last_content.to_string(),
        progress: 50,
        updated_at: chrono::Utc
            .with_ymd_and_hms(2026, 3, 1, 10, minute % 60, 0)
            .single()
            .unwrap_or_default(),
    }
}
