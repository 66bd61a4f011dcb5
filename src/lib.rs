// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! ReedStore - Paged Sorted Tuple Store with B+-Tree Indexing
//!
//! This is the main library entry point for ReedStore.

pub mod reedstore;

// Re-export commonly used types
pub use reedstore::reedstream::{ReedError, ReedResult};
