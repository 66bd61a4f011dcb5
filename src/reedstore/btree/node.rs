// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! B+-Tree Nodes
//!
//! Nodes reference each other by integer ids into the tree's node arena,
//! with `NO_NODE` as the absent-link sentinel. Ids avoid the ownership
//! cycles that direct parent/child/sibling references would create.

use crate::reedstore::pages::sorted::SortedPage;
use serde::{Deserialize, Serialize};

/// Identifier of a node within one B+-tree.
pub type NodeId = i32;

/// Sentinel id for an absent node link.
pub const NO_NODE: NodeId = -1;

/// Role of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Internal node whose tuples encode separator-key/child-id pairs.
    Branch,

    /// Node whose tuples carry user data.
    Leaf,
}

/// One node of a B+-tree.
///
/// ## Invariants
/// - A branch node has a valid `first_child_id` whenever its page holds
///   any tuples; the ids of further children live in the branch tuples
/// - Leaf siblings form a doubly-linked chain in key order
/// - Every non-root node has a parent
#[derive(Debug)]
pub(crate) struct Node {
    /// The node's role.
    pub kind: NodeKind,

    /// The page storing the node's tuple data.
    pub page: SortedPage,

    /// Id of the node's first child (branches only).
    pub first_child_id: NodeId,

    /// Id of the node's parent.
    pub parent_id: NodeId,

    /// Id of the node's left sibling.
    pub left_sibling_id: NodeId,

    /// Id of the node's right sibling.
    pub right_sibling_id: NodeId,
}

impl Node {
    /// Creates an unlinked node over the given page.
    pub fn new(kind: NodeKind, page: SortedPage) -> Self {
        Self {
            kind,
            page,
            first_child_id: NO_NODE,
            parent_id: NO_NODE,
            left_sibling_id: NO_NODE,
            right_sibling_id: NO_NODE,
        }
    }

    /// Returns whether the node has any children.
    pub fn has_children(&self) -> bool {
        self.first_child_id != NO_NODE
    }
}
