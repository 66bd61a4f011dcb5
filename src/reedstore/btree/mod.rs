// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! B+-Tree Index
//!
//! A B+-tree over sorted pages:
//! - node: node records linked by integer ids
//! - controller: page construction strategy and geometry
//! - cursor: ordered positions and range scans over the leaf level
//! - tree: insertion with splitting, bounds, scans, erase and bulk load

pub mod controller;
pub mod cursor;
pub mod node;
pub mod tree;

pub use controller::{InMemoryPageController, PageController};
pub use cursor::{Cursor, RangeScan};
pub use node::{NodeId, NodeKind, NO_NODE};
pub use tree::BTree;

#[cfg(test)]
mod controller_test;
#[cfg(test)]
mod tree_test;
