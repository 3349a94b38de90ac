// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions and recording helpers for stream recovery.

use metrics::describe_counter;

/// Register descriptions for every recovery metric.
pub fn register_metrics() {
    describe_counter!(
        "streamline_resume_total",
        "Resume attempts by outcome (success, failure, timeout, rejected)"
    );
    describe_counter!(
        "streamline_discard_total",
        "Discard attempts by outcome (success, failure, timeout, rejected)"
    );
}

pub(crate) fn record_resume(outcome: &'static str) {
    metrics::counter!("streamline_resume_total", "outcome" => outcome).increment(1);
}

pub(crate) fn record_discard(outcome: &'static str) {
    metrics::counter!("streamline_discard_total", "outcome" => outcome).increment(1);
}
