// SPDX-FileCopyrightText: 2026 Streamline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure content inspection for the Streamline pipeline.
//!
//! This crate provides:
//! - [`ContentClassifier`]: decides whether text is worth rendering
//! - [`extract`]: splits assistant output into visible text and a thinking block

pub mod classifier;
pub mod thinking;

pub use classifier::{Classification, ContentClassifier, SkipReason, DEFAULT_MAX_CONTENT_CHARS};
pub use thinking::{extract, ThinkingExtraction};
