// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Tree Cursors and Range Scans
//!
//! A cursor is an ordered position in the tree's leaf level: a leaf node
//! id plus a position in that leaf's page directory. The end sentinel has
//! no node. Cursors returned by the tree are normalised - they either
//! point at a live tuple or equal the end sentinel - so two cursors over
//! the same tree compare positionally with plain equality.

use crate::reedstore::btree::node::{NodeId, NO_NODE};
use crate::reedstore::btree::tree::BTree;
use crate::reedstore::tuples::backed::TupleRef;

/// Ordered position in a B+-tree's leaf level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub(crate) node_id: NodeId,
    pub(crate) pos: usize,
}

impl Cursor {
    /// The past-the-end sentinel.
    pub const END: Cursor = Cursor {
        node_id: NO_NODE,
        pos: 0,
    };

    /// Returns whether this is the end sentinel.
    pub fn is_end(&self) -> bool {
        self.node_id == NO_NODE
    }

    /// Gets the leaf node id, or `NO_NODE` at the end.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Gets the position within the leaf's page.
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Iterator over the tuples between two cursors, following the leaf
/// sibling chain.
pub struct RangeScan<'a> {
    tree: &'a BTree,
    cursor: Cursor,
    end: Cursor,
}

impl<'a> RangeScan<'a> {
    pub(crate) fn new(tree: &'a BTree, from: Cursor, to: Cursor) -> Self {
        Self {
            tree,
            cursor: from,
            end: to,
        }
    }

    /// Gets the cursor of the next tuple the scan would yield.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }
}

impl<'a> Iterator for RangeScan<'a> {
    type Item = TupleRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == self.end || self.cursor.is_end() {
            return None;
        }

        let tree = self.tree;
        let tuple = tree.cursor_tuple(self.cursor)?;
        self.cursor = tree.advance(self.cursor);
        Some(tuple)
    }
}
