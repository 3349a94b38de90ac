// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idle-time deferral with a hard ceiling.

use std::future::Future;
use std::time::Duration;

use streamline_core::traits::IdleScheduler;
use tracing::trace;

/// Waits for an idle moment, or until `ceiling` elapses, whichever comes first.
///
/// Returns `true` when the idle signal arrived before the ceiling.
pub async fn wait_idle_or_ceiling(idle: &dyn IdleScheduler, ceiling: Duration) -> bool {
    match tokio::time::timeout(ceiling, idle.wait_for_idle()).await {
        Ok(()) => true,
        Err(_) => {
            trace!(ceiling_ms = ceiling.as_millis() as u64, "idle ceiling reached");
            false
        }
    }
}

/// Runs `work` once the runtime is idle. `work` always runs, at the latest
/// when `ceiling` elapses.
pub async fn run_when_idle<F, Fut, T>(idle: &dyn IdleScheduler, ceiling: Duration, work: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    wait_idle_or_ceiling(idle, ceiling).await;
    work().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use streamline_core::traits::idle::YieldIdle;
    use tokio::time::Instant;

    struct NeverIdle;

    #[async_trait]
    impl IdleScheduler for NeverIdle {
        async fn wait_for_idle(&self) {
            std::future::pending::<()>().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_after_ceiling_when_never_idle() {
        let start = Instant::now();
        let value = run_when_idle(&NeverIdle, Duration::from_millis(300), || async { 7 }).await;
        assert_eq!(value, 7);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_when_idle() {
        let start = Instant::now();
        assert!(wait_idle_or_ceiling(&YieldIdle, Duration::from_millis(300)).await);
        assert!(start.elapsed() < Duration::from_millis(300));
    }
}
