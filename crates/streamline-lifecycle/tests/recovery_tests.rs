// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resume and discard against a mock transport.

use std::sync::Arc;
use std::time::Duration;

use streamline_core::error::StreamlineError;
use streamline_core::types::{MessageId, StreamId, StreamingState};
use streamline_lifecycle::{LifecycleRegistry, RecoveryAction, RecoveryCoordinator};
use streamline_test_utils::MockTransport;

fn setup(timeout: Duration) -> (Arc<LifecycleRegistry>, Arc<MockTransport>, RecoveryCoordinator, MessageId) {
    let registry = Arc::new(LifecycleRegistry::new());
    let transport = Arc::new(MockTransport::new());
    let coordinator = RecoveryCoordinator::new(registry.clone(), transport.clone(), timeout);
    let id = MessageId::from("m1");
    registry.track(id.clone(), StreamingState::Interrupted);
    (registry, transport, coordinator, id)
}

#[tokio::test(start_paused = true)]
async fn resume_moves_message_back_to_streaming() {
    let (registry, transport, coordinator, id) = setup(Duration::from_secs(15));

    coordinator.resume(&id, &StreamId::from("s1")).await.expect("resume");

    let record = registry.record(&id).unwrap();
    assert_eq!(record.state, StreamingState::Streaming);
    assert!(!record.is_busy());
    assert_eq!(transport.resumed(), vec![StreamId::from("s1")]);
}

#[tokio::test(start_paused = true)]
async fn concurrent_resumes_reach_transport_once() {
    let (registry, transport, coordinator, id) = setup(Duration::from_secs(15));
    transport.set_delay(Duration::from_millis(500));
    let stream = StreamId::from("s1");

    let (first, second) = tokio::join!(coordinator.resume(&id, &stream), async {
        tokio::task::yield_now().await;
        assert_eq!(
            registry.record(&id).unwrap().busy,
            Some(RecoveryAction::Resuming)
        );
        coordinator.resume(&id, &stream).await
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(StreamlineError::ResumeInFlight { .. })));
    assert_eq!(transport.resume_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_resume_stays_interrupted_and_clears_busy() {
    let (registry, transport, coordinator, id) = setup(Duration::from_secs(15));
    transport.fail_resume(true);

    let err = coordinator
        .resume(&id, &StreamId::from("s1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StreamlineError::Transport { .. }));

    let record = registry.record(&id).unwrap();
    assert_eq!(record.state, StreamingState::Interrupted);
    assert!(!record.is_busy());

    transport.fail_resume(false);
    coordinator.resume(&id, &StreamId::from("s1")).await.expect("retry succeeds");
    assert_eq!(transport.resume_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn timeout_clears_busy_flag() {
    let (registry, transport, coordinator, id) = setup(Duration::from_secs(15));
    transport.set_delay(Duration::from_secs(60));

    let err = coordinator
        .resume(&id, &StreamId::from("s1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StreamlineError::Timeout { duration } if duration == Duration::from_secs(15)));

    let record = registry.record(&id).unwrap();
    assert_eq!(record.state, StreamingState::Interrupted);
    assert!(!record.is_busy());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_resume_future_clears_busy_flag() {
    let (registry, transport, coordinator, id) = setup(Duration::from_secs(15));
    transport.set_delay(Duration::from_secs(10));

    let abandoned = tokio::time::timeout(
        Duration::from_secs(1),
        coordinator.resume(&id, &StreamId::from("s1")),
    )
    .await;
    assert!(abandoned.is_err());

    let record = registry.record(&id).unwrap();
    assert!(!record.is_busy());
    assert!(record.accepts_recovery());
}

#[tokio::test(start_paused = true)]
async fn discard_is_one_way_and_keeps_state() {
    let (registry, transport, coordinator, id) = setup(Duration::from_secs(15));

    coordinator.discard(&id, &StreamId::from("s1")).await.expect("discard");
    let record = registry.record(&id).unwrap();
    assert!(record.discarded);
    assert_eq!(record.state, StreamingState::Interrupted);

    let err = coordinator
        .resume(&id, &StreamId::from("s1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StreamlineError::NoRecoverableStream { .. }));
    assert_eq!(transport.resume_calls(), 0);
    assert_eq!(transport.discarded(), vec![StreamId::from("s1")]);
}

#[tokio::test(start_paused = true)]
async fn resume_rejected_for_complete_message() {
    let (registry, transport, coordinator, _) = setup(Duration::from_secs(15));
    let done = MessageId::from("done");
    registry.track(done.clone(), StreamingState::Complete);

    let err = coordinator
        .resume(&done, &StreamId::from("s1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StreamlineError::InvalidTransition {
            state: StreamingState::Complete,
            action: "resume",
            ..
        }
    ));
    assert_eq!(transport.resume_calls(), 0);
}
