// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions and recording helpers for processing jobs.
//!
//! Recorded through the metrics-rs facade; the binary decides whether a
//! recorder is installed.

use metrics::describe_counter;

/// Register descriptions for every scheduler metric.
pub fn register_metrics() {
    describe_counter!(
        "streamline_jobs_scheduled_total",
        "Processing jobs handed to the debounce timer"
    );
    describe_counter!(
        "streamline_jobs_superseded_total",
        "Jobs cancelled because newer content arrived"
    );
    describe_counter!(
        "streamline_stale_results_total",
        "Job results dropped at commit because they were no longer current"
    );
    describe_counter!(
        "streamline_jobs_completed_total",
        "Jobs whose processed content was committed"
    );
    describe_counter!(
        "streamline_jobs_failed_total",
        "Jobs whose render call failed"
    );
}

pub(crate) fn record_scheduled() {
    metrics::counter!("streamline_jobs_scheduled_total").increment(1);
}

pub(crate) fn record_superseded() {
    metrics::counter!("streamline_jobs_superseded_total").increment(1);
}

pub(crate) fn record_stale() {
    metrics::counter!("streamline_stale_results_total").increment(1);
}

pub(crate) fn record_completed() {
    metrics::counter!("streamline_jobs_completed_total").increment(1);
}

pub(crate) fn record_failed() {
    metrics::counter!("streamline_jobs_failed_total").increment(1);
}
