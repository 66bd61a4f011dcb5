// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! B+-Tree
//!
//! The tree owns a dense id-indexed arena of nodes whose pages come from
//! a pluggable page controller. Leaf tuples carry the record schema;
//! branch tuples carry the branch key fields plus an int child-node id.
//! Insertion descends from the root routing on branch keys, inserts at a
//! leaf and propagates splits upward, growing a new root when a split
//! reaches it. Scans descend to the matching leaf and walk the leaf
//! sibling chain.
//!
//! A single tree instance is not safe for interleaved mutation from
//! multiple threads; callers serialise externally.

use crate::reedstore::btree::controller::PageController;
use crate::reedstore::btree::cursor::{Cursor, RangeScan};
use crate::reedstore::btree::node::{Node, NodeId, NodeKind, NO_NODE};
use crate::reedstore::compare::prefix::prefix_compare;
use crate::reedstore::keys::range::{EndpointKind, RangeKey};
use crate::reedstore::keys::value::ValueKey;
use crate::reedstore::pages::sorted::SortedPage;
use crate::reedstore::reedstream::{empty_page, invalid_config, ReedResult};
use crate::reedstore::tuples::backed::TupleRef;
use crate::reedstore::tuples::fresh::FreshTuple;
use crate::reedstore::tuples::layout::TupleLayout;
use crate::reedstore::tuples::tuple::Tuple;
use crate::reedstore::util::ids::IdAllocator;
use crate::reedstore::util::text::write_tabbed_text;
use log::debug;
use std::cmp::Ordering;
use std::io::Write;

/// Result of splitting a node in two during an insert.
struct Split {
    /// Id of the left-hand node resulting from the split.
    left_id: NodeId,

    /// Id of the right-hand node resulting from the split.
    right_id: NodeId,

    /// Branch key separating the tuples of the two halves.
    splitter: FreshTuple,
}

/// B+-tree over sorted pages.
///
/// ## Invariants
/// - All leaves are at the same depth
/// - Leaf siblings form a doubly-linked chain in key order
/// - `tuple_count` equals the tuple population of the leaf level
pub struct BTree {
    /// Leaf columns forming the branch key.
    branch_key_field_indices: Vec<usize>,

    /// Layout of a branch key (leaf schema projected through the indices).
    branch_key_layout: TupleLayout,

    /// Layout of the branch tuples (`<k1..km, child id>`).
    branch_layout: TupleLayout,

    /// Layout of the leaf tuples (the record schema).
    leaf_layout: TupleLayout,

    /// Allocator for node ids.
    node_ids: IdAllocator,

    /// Dense id-indexed node arena.
    nodes: Vec<Option<Node>>,

    /// Controller constructing branch and leaf pages.
    controller: Box<dyn PageController>,

    /// Id of the root node.
    root_id: NodeId,

    /// Number of tuples stored in the leaf level.
    tuple_count: usize,
}

impl BTree {
    /// Creates a tree whose pages come from the given controller. The new
    /// tree consists of a single empty leaf root.
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptySchema` if the controller's layouts or key
    ///   indices are degenerate
    /// - `ReedError::InvalidConfig` if the branch layout does not consist
    ///   of the branch key fields plus an int child-id field
    pub fn new(controller: Box<dyn PageController>) -> ReedResult<Self> {
        let branch_layout = controller.branch_tuple_layout();
        let leaf_layout = controller.leaf_tuple_layout();
        let branch_key_field_indices = controller.branch_key_field_indices();
        let branch_key_layout =
            TupleLayout::project(leaf_layout.manipulators(), &branch_key_field_indices)?;

        if branch_layout.arity() != branch_key_field_indices.len() + 1 {
            return Err(invalid_config(
                "btree",
                format!(
                    "branch arity {} does not match key arity {} plus a child id",
                    branch_layout.arity(),
                    branch_key_field_indices.len()
                ),
            ));
        }

        let mut tree = Self {
            branch_key_field_indices,
            branch_key_layout,
            branch_layout,
            leaf_layout,
            node_ids: IdAllocator::new(),
            nodes: Vec::new(),
            controller,
            root_id: NO_NODE,
            tuple_count: 0,
        };
        tree.root_id = tree.add_node(NodeKind::Leaf)?;
        Ok(tree)
    }

    /// Gets the number of tuples stored in the tree's leaf nodes.
    pub fn tuple_count(&self) -> usize {
        self.tuple_count
    }

    /// Gets the layout of the tree's branch (index) tuples.
    pub fn branch_tuple_layout(&self) -> TupleLayout {
        self.branch_layout.clone()
    }

    /// Gets the layout of the tree's leaf (data) tuples.
    pub fn leaf_tuple_layout(&self) -> TupleLayout {
        self.leaf_layout.clone()
    }

    /// Gets the number of levels in the tree (1 for a lone leaf root).
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut id = self.root_id;
        while self.node(id).kind == NodeKind::Branch {
            id = self.node(id).first_child_id;
            depth += 1;
        }
        depth
    }

    /// Inserts a tuple into the tree, splitting nodes as necessary.
    ///
    /// ## Behaviour
    /// - Descends from the root, at each branch routing to the child of
    ///   the greatest separator not exceeding the tuple's branch key
    /// - A full leaf is split in two with the tuple placed by comparison
    ///   against the right half's first key; splits propagate upward and
    ///   grow a new root when they reach it
    ///
    /// ## Performance
    /// - O(log n) descent; splits touch at most one node per level
    ///
    /// ## Error Conditions
    /// - `ReedError::TypeIncompatible` if the tuple's fields cannot be
    ///   converted to the leaf schema
    pub fn insert_tuple(&mut self, tuple: &dyn Tuple) -> ReedResult<()> {
        let root_id = self.root_id;
        if let Some(split) = self.insert_into_subtree(tuple, root_id)? {
            self.add_root_node(split)?;
        }
        self.tuple_count += 1;
        Ok(())
    }

    /// Clears the tree back to a single empty leaf root.
    pub fn clear(&mut self) -> ReedResult<()> {
        self.nodes.clear();
        self.node_ids.reset();
        self.tuple_count = 0;
        self.root_id = self.add_node(NodeKind::Leaf)?;
        debug!("btree: cleared");
        Ok(())
    }

    /// Rebuilds the tree from leaf pages that are already in key order.
    ///
    /// ## Input
    /// - `pages`: Non-empty leaf pages whose tuples are in ascending key
    ///   order across the whole sequence
    ///
    /// ## Behaviour
    /// - The pages become the leaf level (sibling chain in order); branch
    ///   levels are packed bottom-up from `<first key, child>` separators
    ///   until a single root remains
    /// - An empty input sequence is equivalent to `clear`
    ///
    /// ## Performance
    /// - O(number of nodes); no per-tuple routing or splitting happens
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptyPage` if any supplied page holds no tuples
    pub fn bulk_load(&mut self, pages: Vec<SortedPage>) -> ReedResult<()> {
        if let Some(index) = pages.iter().position(|page| page.tuple_count() == 0) {
            return Err(empty_page(index));
        }

        self.nodes.clear();
        self.node_ids.reset();
        self.tuple_count = 0;
        self.root_id = NO_NODE;

        if pages.is_empty() {
            self.root_id = self.add_node(NodeKind::Leaf)?;
            return Ok(());
        }

        // Adopt the pages as the leaf level, carrying each node's minimal
        // branch key for separator construction.
        let mut level: Vec<(NodeId, FreshTuple)> = Vec::with_capacity(pages.len());
        for page in pages {
            self.tuple_count += page.tuple_count();
            let id = self.adopt_node(NodeKind::Leaf, page)?;
            if let Some(&(previous, _)) = level.last() {
                self.link_siblings(previous, id);
            }
            let key = self.make_branch_key(&self.node(id).page.tuple_at(0))?;
            level.push((id, key));
        }

        // Pack parent levels until a single root remains.
        while level.len() > 1 {
            let mut parents: Vec<(NodeId, FreshTuple)> = Vec::new();

            for &(child_id, ref child_key) in &level {
                let open_parent = match parents.last() {
                    Some(&(parent_id, _))
                        if self.node(parent_id).page.empty_tuple_count() > 0 =>
                    {
                        Some(parent_id)
                    }
                    _ => None,
                };

                let parent_id = match open_parent {
                    Some(parent_id) => {
                        let separator = self.make_branch_tuple(child_key, child_id)?;
                        self.node_mut(parent_id).page.add_tuple(&separator)?;
                        parent_id
                    }
                    None => {
                        let parent_id = self.add_node(NodeKind::Branch)?;
                        if let Some(&(previous, _)) = parents.last() {
                            self.link_siblings(previous, parent_id);
                        }
                        self.node_mut(parent_id).first_child_id = child_id;
                        parents.push((parent_id, child_key.clone()));
                        parent_id
                    }
                };

                self.node_mut(child_id).parent_id = parent_id;
            }

            level = parents;
        }

        self.root_id = level[0].0;
        debug!(
            "btree: bulk loaded {} tuples into {} levels",
            self.tuple_count,
            self.depth()
        );
        Ok(())
    }

    /// Erases every tuple equivalent to the value key.
    ///
    /// ## Behaviour
    /// - Deletion happens at the leaf level only; no underflow handling,
    ///   merging or node deallocation takes place
    ///
    /// ## Output
    /// - Number of tuples erased
    pub fn erase_tuples(&mut self, key: &ValueKey) -> ReedResult<usize> {
        let mut erased = 0;

        loop {
            let cursor = self.lower_bound(key)?;
            let matched = match self.cursor_tuple(cursor) {
                Some(tuple) => prefix_compare(&tuple, key)? == Ordering::Equal,
                None => false,
            };
            if !matched {
                break;
            }
            self.erase_at(cursor)?;
            erased += 1;
        }

        Ok(erased)
    }

    /// Erases the first tuple within the range, if the range is non-empty.
    ///
    /// ## Behaviour
    /// - Deletion happens at the leaf level only; no underflow handling,
    ///   merging or node deallocation takes place
    ///
    /// ## Output
    /// - Whether a tuple was erased
    pub fn erase_tuple(&mut self, key: &RangeKey) -> ReedResult<bool> {
        let lower = self.range_lower_bound(key)?;
        let upper = self.range_upper_bound(key)?;
        if lower == upper {
            return Ok(false);
        }

        // Guard against inverted ranges: the candidate must satisfy the
        // high endpoint as well.
        if let (Some(endpoint), Some(tuple)) = (key.high(), self.cursor_tuple(lower)) {
            let ordering = prefix_compare(&tuple, endpoint.value())?;
            let inside = match endpoint.kind() {
                EndpointKind::Closed => ordering != Ordering::Greater,
                EndpointKind::Open => ordering == Ordering::Less,
            };
            if !inside {
                return Ok(false);
            }
        }

        self.erase_at(lower)?;
        Ok(true)
    }

    /// Returns a cursor to the first tuple of the leftmost leaf.
    pub fn begin(&self) -> Cursor {
        let mut id = self.root_id;
        while self.node(id).kind == NodeKind::Branch {
            id = self.node(id).first_child_id;
        }
        self.normalise(Cursor { node_id: id, pos: 0 })
    }

    /// Returns the past-the-end cursor.
    pub fn end(&self) -> Cursor {
        Cursor::END
    }

    /// Returns a cursor to the first tuple not ordered before the key.
    pub fn lower_bound(&self, key: &ValueKey) -> ReedResult<Cursor> {
        self.value_bound(key, true)
    }

    /// Returns a cursor one beyond the last tuple equivalent to the key.
    pub fn upper_bound(&self, key: &ValueKey) -> ReedResult<Cursor> {
        self.value_bound(key, false)
    }

    /// Returns the pair `(lower_bound(key), upper_bound(key))`.
    pub fn equal_range(&self, key: &ValueKey) -> ReedResult<(Cursor, Cursor)> {
        Ok((self.lower_bound(key)?, self.upper_bound(key)?))
    }

    /// Returns a cursor to the first tuple within the range.
    ///
    /// ## Behaviour
    /// - No low endpoint: `begin()`
    /// - Closed low endpoint: first tuple >= the endpoint value
    /// - Open low endpoint: first tuple > the endpoint value
    pub fn range_lower_bound(&self, key: &RangeKey) -> ReedResult<Cursor> {
        match key.low() {
            None => Ok(self.begin()),
            Some(endpoint) => match endpoint.kind() {
                EndpointKind::Closed => self.value_bound(endpoint.value(), true),
                EndpointKind::Open => self.value_bound(endpoint.value(), false),
            },
        }
    }

    /// Returns a cursor one beyond the last tuple within the range.
    ///
    /// ## Behaviour
    /// - No high endpoint: `end()`
    /// - Closed high endpoint: first tuple > the endpoint value
    /// - Open high endpoint: first tuple >= the endpoint value
    pub fn range_upper_bound(&self, key: &RangeKey) -> ReedResult<Cursor> {
        match key.high() {
            None => Ok(Cursor::END),
            Some(endpoint) => match endpoint.kind() {
                EndpointKind::Closed => self.value_bound(endpoint.value(), false),
                EndpointKind::Open => self.value_bound(endpoint.value(), true),
            },
        }
    }

    /// Returns the pair `(range_lower_bound(key), range_upper_bound(key))`.
    pub fn range_bounds(&self, key: &RangeKey) -> ReedResult<(Cursor, Cursor)> {
        Ok((self.range_lower_bound(key)?, self.range_upper_bound(key)?))
    }

    /// Iterates over every tuple in the tree in key order.
    pub fn iter(&self) -> RangeScan<'_> {
        RangeScan::new(self, self.begin(), Cursor::END)
    }

    /// Iterates over the tuples between two cursors.
    pub fn range(&self, from: Cursor, to: Cursor) -> RangeScan<'_> {
        RangeScan::new(self, from, to)
    }

    /// Gets the tuple a cursor points at, if it is not at the end.
    pub fn cursor_tuple(&self, cursor: Cursor) -> Option<TupleRef<'_>> {
        if cursor.is_end() {
            return None;
        }
        let node = self.node(cursor.node_id);
        if cursor.pos < node.page.tuple_count() {
            Some(node.page.tuple_at(cursor.pos))
        } else {
            None
        }
    }

    /// Advances a cursor to the next tuple, following the leaf sibling
    /// chain and ending at the sentinel.
    pub fn advance(&self, cursor: Cursor) -> Cursor {
        if cursor.is_end() {
            return Cursor::END;
        }
        self.normalise(Cursor {
            node_id: cursor.node_id,
            pos: cursor.pos + 1,
        })
    }

    /// Prints the tree to a stream for debugging: one tab-indented line
    /// per node in depth order, with node id, sibling ids and tuples.
    pub fn print<W: Write>(&self, writer: &mut W) -> ReedResult<()> {
        self.print_subtree(writer, self.root_id, 0)
    }

    // == INSERTION ==

    fn insert_into_subtree(
        &mut self,
        tuple: &dyn Tuple,
        node_id: NodeId,
    ) -> ReedResult<Option<Split>> {
        match self.node(node_id).kind {
            NodeKind::Leaf => self.insert_into_leaf(tuple, node_id),
            NodeKind::Branch => self.insert_into_branch(tuple, node_id),
        }
    }

    fn insert_into_leaf(&mut self, tuple: &dyn Tuple, node_id: NodeId) -> ReedResult<Option<Split>> {
        if self.node(node_id).page.empty_tuple_count() == 0 {
            Ok(Some(self.split_leaf_and_insert(node_id, tuple)?))
        } else {
            self.node_mut(node_id).page.add_tuple(tuple)?;
            Ok(None)
        }
    }

    fn insert_into_branch(
        &mut self,
        tuple: &dyn Tuple,
        node_id: NodeId,
    ) -> ReedResult<Option<Split>> {
        let key = self.make_branch_key(tuple)?;
        let child_id = self.route_child(node_id, &key, false)?;

        let split = match self.insert_into_subtree(tuple, child_id)? {
            None => return Ok(None),
            Some(split) => split,
        };

        let separator = self.make_branch_tuple(&split.splitter, split.right_id)?;
        if self.node(node_id).page.empty_tuple_count() == 0 {
            Ok(Some(self.split_branch_and_insert(node_id, &separator)?))
        } else {
            self.node_mut(node_id).page.add_tuple(&separator)?;
            Ok(None)
        }
    }

    /// Splits a full leaf, linking a fresh right sibling, moving the upper
    /// half across and placing the incoming tuple by comparison with the
    /// right half's first key.
    fn split_leaf_and_insert(&mut self, node_id: NodeId, tuple: &dyn Tuple) -> ReedResult<Split> {
        let fresh_id = self.add_node(NodeKind::Leaf)?;
        self.insert_node_as_right_sibling_of(node_id, fresh_id);

        let count = self.node(node_id).page.tuple_count();
        self.transfer_tuples_right(node_id, fresh_id, count / 2)?;
        self.selectively_insert_tuple(tuple, node_id, fresh_id)?;

        let splitter = self.make_branch_key(&self.node(fresh_id).page.tuple_at(0))?;
        debug!("btree: split leaf {} with new right sibling {}", node_id, fresh_id);
        Ok(Split {
            left_id: node_id,
            right_id: fresh_id,
            splitter,
        })
    }

    /// Splits a full branch. The median tuple is promoted: its child
    /// becomes the right branch's first child and its key the splitter;
    /// the median itself is copied into neither half.
    fn split_branch_and_insert(
        &mut self,
        node_id: NodeId,
        separator: &FreshTuple,
    ) -> ReedResult<Split> {
        let fresh_id = self.add_node(NodeKind::Branch)?;
        self.insert_node_as_right_sibling_of(node_id, fresh_id);

        let tuples = self.copy_page_tuples(node_id)?;
        let median = tuples.len() / 2;

        for tuple in &tuples[median + 1..] {
            self.node_mut(fresh_id).page.add_tuple(tuple)?;
        }
        for tuple in &tuples[median..] {
            self.node_mut(node_id).page.delete_tuple(tuple)?;
        }

        self.node_mut(fresh_id).first_child_id = child_node_id(&tuples[median])?;

        let mut splitter = FreshTuple::new(self.branch_key_layout.clone());
        for i in 0..splitter.arity() {
            splitter.field_mut(i).set_from(&tuples[median].field(i))?;
        }

        let target = if prefix_compare(separator, &splitter)? == Ordering::Less {
            node_id
        } else {
            fresh_id
        };
        self.node_mut(target).page.add_tuple(separator)?;

        self.adopt_children(fresh_id)?;

        debug!(
            "btree: split branch {} with new right sibling {}",
            node_id, fresh_id
        );
        Ok(Split {
            left_id: node_id,
            right_id: fresh_id,
            splitter,
        })
    }

    /// Grows a new branch root above a split of the old root.
    fn add_root_node(&mut self, split: Split) -> ReedResult<()> {
        let new_root = self.add_node(NodeKind::Branch)?;
        let separator = self.make_branch_tuple(&split.splitter, split.right_id)?;

        self.node_mut(new_root).first_child_id = split.left_id;
        self.node_mut(new_root).page.add_tuple(&separator)?;
        self.node_mut(split.left_id).parent_id = new_root;
        self.node_mut(split.right_id).parent_id = new_root;
        self.root_id = new_root;

        debug!("btree: grew new root {}", new_root);
        Ok(())
    }

    /// Inserts `fresh_id` into the sibling chain as the right sibling of
    /// `node_id`, with the same parent.
    fn insert_node_as_right_sibling_of(&mut self, node_id: NodeId, fresh_id: NodeId) {
        let old_right = self.node(node_id).right_sibling_id;
        let parent = self.node(node_id).parent_id;

        {
            let fresh = self.node_mut(fresh_id);
            fresh.left_sibling_id = node_id;
            fresh.right_sibling_id = old_right;
            fresh.parent_id = parent;
        }

        self.node_mut(node_id).right_sibling_id = fresh_id;
        if old_right != NO_NODE {
            self.node_mut(old_right).left_sibling_id = fresh_id;
        }
    }

    /// Moves the last `n` tuples of a node's page to another node's page.
    /// Parent bookkeeping is the caller's job.
    fn transfer_tuples_right(
        &mut self,
        source_id: NodeId,
        target_id: NodeId,
        n: usize,
    ) -> ReedResult<()> {
        let moved = {
            let page = &self.node(source_id).page;
            let count = page.tuple_count();
            (count - n..count)
                .map(|pos| {
                    let mut copy = FreshTuple::new(page.layout().clone());
                    copy.copy_from(&page.tuple_at(pos))?;
                    Ok(copy)
                })
                .collect::<ReedResult<Vec<_>>>()?
        };

        for tuple in &moved {
            self.node_mut(target_id).page.add_tuple(tuple)?;
        }
        for tuple in &moved {
            self.node_mut(source_id).page.delete_tuple(tuple)?;
        }
        Ok(())
    }

    /// Inserts a tuple into the left or right of two adjacent nodes, based
    /// on a comparison against the first tuple of the right-hand node.
    fn selectively_insert_tuple(
        &mut self,
        tuple: &dyn Tuple,
        left_id: NodeId,
        right_id: NodeId,
    ) -> ReedResult<()> {
        let target = {
            let right_first = self.node(right_id).page.tuple_at(0);
            if prefix_compare(tuple, &right_first)? == Ordering::Less {
                left_id
            } else {
                right_id
            }
        };
        self.node_mut(target).page.add_tuple(tuple)
    }

    /// Points the parent id of every child of a branch at that branch.
    fn adopt_children(&mut self, branch_id: NodeId) -> ReedResult<()> {
        let mut children = vec![self.node(branch_id).first_child_id];
        {
            let page = &self.node(branch_id).page;
            for pos in 0..page.tuple_count() {
                children.push(child_node_id(&page.tuple_at(pos))?);
            }
        }

        for child in children {
            if child != NO_NODE {
                self.node_mut(child).parent_id = branch_id;
            }
        }
        Ok(())
    }

    // == ROUTING & BOUNDS ==

    /// Picks the child of a branch for the given key: the child of the
    /// greatest separator not exceeding the key (`lower` false, the insert
    /// rule), or the child before the first separator >= the key (`lower`
    /// true, used by lower-bound scans so duplicates left of their own
    /// separator are still found).
    fn route_child(&self, branch_id: NodeId, key: &dyn Tuple, lower: bool) -> ReedResult<NodeId> {
        let node = self.node(branch_id);
        let pos = if lower {
            node.page.lower_bound_tuple(key)?
        } else {
            node.page.upper_bound_tuple(key)?
        };

        if pos == 0 {
            Ok(node.first_child_id)
        } else {
            child_node_id(&node.page.tuple_at(pos - 1))
        }
    }

    /// Descends to the leaf-level bound for a probe key.
    fn value_bound(&self, key: &dyn Tuple, lower: bool) -> ReedResult<Cursor> {
        let mut id = self.root_id;
        while self.node(id).kind == NodeKind::Branch {
            id = self.route_child(id, key, lower)?;
        }

        let page = &self.node(id).page;
        let pos = if lower {
            page.lower_bound_tuple(key)?
        } else {
            page.upper_bound_tuple(key)?
        };

        Ok(self.normalise(Cursor { node_id: id, pos }))
    }

    /// Normalises a cursor: skips past exhausted and empty leaves along
    /// the sibling chain, collapsing to the end sentinel.
    fn normalise(&self, cursor: Cursor) -> Cursor {
        let mut node_id = cursor.node_id;
        let mut pos = cursor.pos;

        loop {
            if node_id == NO_NODE {
                return Cursor::END;
            }
            if pos < self.node(node_id).page.tuple_count() {
                return Cursor { node_id, pos };
            }
            node_id = self.node(node_id).right_sibling_id;
            pos = 0;
        }
    }

    // == ERASE ==

    /// Deletes the tuple at a (non-end) cursor from its leaf page.
    fn erase_at(&mut self, cursor: Cursor) -> ReedResult<()> {
        let copy = {
            let page = &self.node(cursor.node_id).page;
            let mut copy = FreshTuple::new(page.layout().clone());
            copy.copy_from(&page.tuple_at(cursor.pos))?;
            copy
        };

        self.node_mut(cursor.node_id).page.delete_tuple(&copy)?;
        self.tuple_count -= 1;
        Ok(())
    }

    // == NODE ARENA ==

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id as usize]
            .as_ref()
            .expect("node id refers to a live node")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id as usize]
            .as_mut()
            .expect("node id refers to a live node")
    }

    fn add_node(&mut self, kind: NodeKind) -> ReedResult<NodeId> {
        let page = match kind {
            NodeKind::Branch => self.controller.make_branch_page()?,
            NodeKind::Leaf => self.controller.make_leaf_page()?,
        };
        self.adopt_node(kind, page)
    }

    fn adopt_node(&mut self, kind: NodeKind, page: SortedPage) -> ReedResult<NodeId> {
        let id = self.node_ids.allocate();
        let index = id as usize;
        if index >= self.nodes.len() {
            self.nodes.resize_with(index + 1, || None);
        }
        self.nodes[index] = Some(Node::new(kind, page));
        Ok(id)
    }

    fn link_siblings(&mut self, left_id: NodeId, right_id: NodeId) {
        self.node_mut(left_id).right_sibling_id = right_id;
        self.node_mut(right_id).left_sibling_id = left_id;
    }

    // == KEYS & SEPARATORS ==

    /// Makes a branch key from the relevant fields of a leaf tuple.
    fn make_branch_key(&self, source: &dyn Tuple) -> ReedResult<FreshTuple> {
        let mut key = FreshTuple::new(self.branch_key_layout.clone());
        for (i, &index) in self.branch_key_field_indices.iter().enumerate() {
            key.field_mut(i).set_from(&source.field(index))?;
        }
        Ok(key)
    }

    /// Makes a branch tuple `<splitter fields, child id>`.
    fn make_branch_tuple(&self, splitter: &FreshTuple, child_id: NodeId) -> ReedResult<FreshTuple> {
        let mut tuple = FreshTuple::new(self.branch_layout.clone());
        let key_arity = splitter.arity();
        for i in 0..key_arity {
            tuple.field_mut(i).set_from(&splitter.field(i))?;
        }
        tuple.field_mut(key_arity).set_int(child_id)?;
        Ok(tuple)
    }

    /// Copies every tuple of a node's page, in prefix order.
    fn copy_page_tuples(&self, node_id: NodeId) -> ReedResult<Vec<FreshTuple>> {
        let page = &self.node(node_id).page;
        (0..page.tuple_count())
            .map(|pos| {
                let mut copy = FreshTuple::new(page.layout().clone());
                copy.copy_from(&page.tuple_at(pos))?;
                Ok(copy)
            })
            .collect()
    }

    // == DEBUG PRINTING ==

    fn print_subtree<W: Write>(
        &self,
        writer: &mut W,
        node_id: NodeId,
        depth: usize,
    ) -> ReedResult<()> {
        let node = self.node(node_id);

        let mut line = format!(
            "node {} (left: {}, right: {}):",
            node_id, node.left_sibling_id, node.right_sibling_id
        );
        for pos in 0..node.page.tuple_count() {
            line.push(' ');
            line.push_str(&render_tuple(&node.page.tuple_at(pos))?);
        }
        write_tabbed_text(writer, depth, &line)?;

        if node.kind == NodeKind::Branch {
            self.print_subtree(writer, node.first_child_id, depth + 1)?;
            for pos in 0..self.node(node_id).page.tuple_count() {
                let child = child_node_id(&self.node(node_id).page.tuple_at(pos))?;
                self.print_subtree(writer, child, depth + 1)?;
            }
        }
        Ok(())
    }
}

/// Extracts the child node id from a branch tuple `<k1..km, child id>`.
fn child_node_id(branch_tuple: &dyn Tuple) -> ReedResult<NodeId> {
    branch_tuple.field(branch_tuple.arity() - 1).get_int()
}

fn render_tuple(tuple: &dyn Tuple) -> ReedResult<String> {
    let mut fields = Vec::with_capacity(tuple.arity());
    for i in 0..tuple.arity() {
        fields.push(tuple.field(i).get_string()?);
    }
    Ok(format!("({})", fields.join(",")))
}

#[cfg(test)]
impl BTree {
    /// Depth of every leaf, walking all root-to-leaf paths.
    pub(crate) fn leaf_depths(&self) -> Vec<usize> {
        let mut depths = Vec::new();
        self.collect_leaf_depths(self.root_id, 1, &mut depths);
        depths
    }

    fn collect_leaf_depths(&self, node_id: NodeId, depth: usize, out: &mut Vec<usize>) {
        let node = self.node(node_id);
        match node.kind {
            NodeKind::Leaf => out.push(depth),
            NodeKind::Branch => {
                self.collect_leaf_depths(node.first_child_id, depth + 1, out);
                for pos in 0..node.page.tuple_count() {
                    let child = child_node_id(&node.page.tuple_at(pos)).expect("branch child id");
                    self.collect_leaf_depths(child, depth + 1, out);
                }
            }
        }
    }

    /// Leaf ids in sibling-chain order from the leftmost leaf.
    pub(crate) fn leaf_chain(&self) -> Vec<NodeId> {
        let mut id = self.root_id;
        while self.node(id).kind == NodeKind::Branch {
            id = self.node(id).first_child_id;
        }

        let mut chain = Vec::new();
        while id != NO_NODE {
            chain.push(id);
            id = self.node(id).right_sibling_id;
        }
        chain
    }

    pub(crate) fn left_sibling_of(&self, id: NodeId) -> NodeId {
        self.node(id).left_sibling_id
    }

    pub(crate) fn parent_of(&self, id: NodeId) -> NodeId {
        self.node(id).parent_id
    }

    pub(crate) fn root_node_id(&self) -> NodeId {
        self.root_id
    }
}
