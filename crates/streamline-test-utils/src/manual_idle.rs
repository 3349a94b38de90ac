// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idle signal under test control.

use async_trait::async_trait;
use streamline_core::traits::IdleScheduler;
use tokio::sync::Notify;

/// Idle scheduler that only reports idle when the test says so.
///
/// Without a call to [`release`](Self::release) waiters rely on the
/// scheduler's ceiling.
#[derive(Debug, Default)]
pub struct ManualIdle {
    notify: Notify,
}

impl ManualIdle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wakes one waiter, or the next one to arrive.
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

#[async_trait]
impl IdleScheduler for ManualIdle {
    async fn wait_for_idle(&self) {
        self.notify.notified().await;
    }
}
