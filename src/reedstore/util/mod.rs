// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Utility Services
//!
//! Small building blocks shared across the storage engine:
//! - alignment: offset tracking for manual buffer layout
//! - ids: dense integer id allocation with reuse
//! - text: formatting helpers for debug output

pub mod alignment;
pub mod ids;
pub mod text;

pub use alignment::AlignmentTracker;
pub use ids::IdAllocator;

#[cfg(test)]
mod text_test;
