// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idle-time scheduling primitive.

use async_trait::async_trait;

/// Resolves once the runtime has spare capacity for non-urgent work.
///
/// Implementations may wait indefinitely; callers always bound the wait with
/// a hard timeout and run the deferred work once it elapses.
#[async_trait]
pub trait IdleScheduler: Send + Sync + 'static {
    async fn wait_for_idle(&self);
}

/// Treats the runtime as idle after yielding once to other ready tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct YieldIdle;

#[async_trait]
impl IdleScheduler for YieldIdle {
    async fn wait_for_idle(&self) {
        tokio::task::yield_now().await;
    }
}
