// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timer-driven scheduler behaviour, run on paused tokio time.

use std::sync::Arc;
use std::time::Duration;

use streamline_core::types::{MessageId, ProcessingOptions, ProcessingState};
use streamline_scheduler::{ProcessingScheduler, SchedulerSettings};
use streamline_test_utils::{ManualIdle, MockRenderer};
use tokio::sync::watch;
use tokio::time::{advance, Instant};

fn scheduler_with(renderer: Arc<MockRenderer>, idle: Arc<ManualIdle>) -> ProcessingScheduler {
    ProcessingScheduler::new(renderer, idle, SchedulerSettings::default())
}

/// Waits until the state leaves `Processing`.
async fn settled(rx: &mut watch::Receiver<ProcessingState>) -> ProcessingState {
    rx.wait_for(|state| !state.is_processing())
        .await
        .expect("scheduler dropped the slot")
        .clone()
}

/// Lets spawned tasks run without moving the clock.
async fn drain() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn small_content_waits_for_base_debounce() {
    let renderer = Arc::new(MockRenderer::new());
    let scheduler = scheduler_with(renderer.clone(), Arc::new(ManualIdle::new()));
    let id = MessageId::from("m1");

    let start = Instant::now();
    let mut rx = scheduler.schedule(id.clone(), "**hi**".into(), ProcessingOptions::default());
    assert!(rx.borrow().is_processing());

    let state = settled(&mut rx).await;
    assert!(state.processed().is_some());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200) && elapsed < Duration::from_millis(250));
    assert_eq!(renderer.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn large_content_doubles_debounce_and_respects_idle_ceiling() {
    let renderer = Arc::new(MockRenderer::new());
    let idle = Arc::new(ManualIdle::new());
    let scheduler = scheduler_with(renderer.clone(), idle);
    let id = MessageId::from("m1");
    let text = "x".repeat(1_500);

    let start = Instant::now();
    let mut rx = scheduler.schedule(id, text, ProcessingOptions::default());
    settled(&mut rx).await;

    // 400 ms debounce, then the idle signal never arrives so the 300 ms ceiling applies.
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(700) && elapsed < Duration::from_millis(750));
    assert_eq!(renderer.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn idle_signal_releases_large_content_early() {
    let renderer = Arc::new(MockRenderer::new());
    let idle = Arc::new(ManualIdle::new());
    let scheduler = scheduler_with(renderer.clone(), idle.clone());
    let id = MessageId::from("m1");

    let mut rx = scheduler.schedule(id, "y".repeat(2_000), ProcessingOptions::default());
    advance(Duration::from_millis(400)).await;
    drain().await;
    assert_eq!(renderer.call_count(), 0);

    idle.release();
    let state = settled(&mut rx).await;
    assert!(state.processed().is_some());
    assert_eq!(renderer.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn rapid_updates_only_render_the_last_content() {
    let renderer = Arc::new(MockRenderer::new());
    let scheduler = scheduler_with(renderer.clone(), Arc::new(ManualIdle::new()));
    let id = MessageId::from("m1");

    let mut rx = scheduler.schedule(id.clone(), "C1".into(), ProcessingOptions::default());
    advance(Duration::from_millis(100)).await;
    rx = scheduler.schedule(id.clone(), "C2".into(), ProcessingOptions::default());

    let state = settled(&mut rx).await;
    assert!(state.processed().is_some_and(|p| p.html.contains("C2")));
    assert_eq!(renderer.calls(), vec!["C2".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn slow_superseded_render_never_overwrites_newer_result() {
    let renderer = Arc::new(MockRenderer::new());
    renderer.set_delay("C1", Duration::from_secs(2));
    let scheduler = scheduler_with(renderer.clone(), Arc::new(ManualIdle::new()));
    let id = MessageId::from("m1");

    scheduler.schedule(id.clone(), "C1".into(), ProcessingOptions::default());
    // C1 is past its debounce and inside the slow render call.
    advance(Duration::from_millis(250)).await;
    drain().await;
    assert_eq!(renderer.calls(), vec!["C1".to_string()]);

    let mut rx = scheduler.schedule(id.clone(), "C2".into(), ProcessingOptions::default());
    let state = settled(&mut rx).await;
    assert!(state.processed().is_some_and(|p| p.html.contains("C2")));

    // Well past the point where C1 would have resolved.
    advance(Duration::from_secs(5)).await;
    drain().await;
    let state = scheduler.state(&id);
    assert!(state.processed().is_some_and(|p| p.html.contains("C2")));
    assert!(!renderer.completed().contains(&"C1".to_string()));
}

#[tokio::test(start_paused = true)]
async fn render_failure_surfaces_as_error_state() {
    let renderer = Arc::new(MockRenderer::new());
    renderer.fail_on("boom");
    let scheduler = scheduler_with(renderer, Arc::new(ManualIdle::new()));
    let id = MessageId::from("m1");

    let mut rx = scheduler.schedule(id.clone(), "# boom".into(), ProcessingOptions::default());
    match settled(&mut rx).await {
        ProcessingState::Error(message) => assert!(message.contains("boom")),
        other => panic!("expected error state, got {other:?}"),
    }
    assert!(scheduler.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn identical_content_is_served_from_cache() {
    let renderer = Arc::new(MockRenderer::new());
    let scheduler = scheduler_with(renderer.clone(), Arc::new(ManualIdle::new()));
    let id = MessageId::from("m1");
    let options = ProcessingOptions::default();

    let mut rx = scheduler.schedule(id.clone(), "`a`".into(), options.clone());
    settled(&mut rx).await;

    let rx = scheduler.schedule(id.clone(), "`a`".into(), options.clone());
    assert!(rx.borrow().processed().is_some());
    assert!(!scheduler.in_flight(&id));
    assert_eq!(renderer.call_count(), 1);
    assert!(scheduler.cached(&id, "`a`", &options).is_some());
}

#[tokio::test(start_paused = true)]
async fn render_is_idempotent() {
    let renderer = Arc::new(MockRenderer::new());
    let scheduler = scheduler_with(renderer, Arc::new(ManualIdle::new()));
    let options = ProcessingOptions::default();

    let first = scheduler.render_now("## title\n- a", &options).await.expect("render");
    let second = scheduler.render_now("## title\n- a", &options).await.expect("render");
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_pending_job() {
    let renderer = Arc::new(MockRenderer::new());
    let scheduler = scheduler_with(renderer.clone(), Arc::new(ManualIdle::new()));
    let id = MessageId::from("m1");

    scheduler.schedule(id.clone(), "*x*".into(), ProcessingOptions::default());
    assert!(scheduler.in_flight(&id));
    scheduler.cancel(&id);

    advance(Duration::from_secs(1)).await;
    drain().await;
    assert_eq!(renderer.call_count(), 0);
    assert_eq!(scheduler.state(&id), ProcessingState::Idle);
}

#[tokio::test(start_paused = true)]
async fn remove_closes_subscribers_and_forgets_cache() {
    let renderer = Arc::new(MockRenderer::new());
    let scheduler = scheduler_with(renderer.clone(), Arc::new(ManualIdle::new()));
    let id = MessageId::from("m1");

    let mut rx = scheduler.schedule(id.clone(), "*x*".into(), ProcessingOptions::default());
    settled(&mut rx).await;
    scheduler.remove(&id);

    assert!(rx.changed().await.is_err());
    assert!(scheduler.cache().latest(&id).is_none());
    assert!(scheduler.subscribe(&id).is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_everything_and_rejects_new_work() {
    let renderer = Arc::new(MockRenderer::new());
    let scheduler = scheduler_with(renderer.clone(), Arc::new(ManualIdle::new()));

    for n in 0..3 {
        scheduler.schedule(MessageId(format!("m{n}")), "*x*".into(), ProcessingOptions::default());
    }
    scheduler.shutdown();
    let rx = scheduler.schedule(MessageId::from("late"), "*y*".into(), ProcessingOptions::default());

    advance(Duration::from_secs(1)).await;
    drain().await;
    assert_eq!(renderer.call_count(), 0);
    assert_eq!(*rx.borrow(), ProcessingState::Idle);
}
