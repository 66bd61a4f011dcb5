// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Page Controllers
//!
//! A page controller decides how a B+-tree's pages are constructed and
//! which tuple layouts its branch and leaf tuples carry. The tree depends
//! only on this trait, so alternative backends (e.g. cache-backed pages)
//! can be plugged in without touching the tree itself.

use crate::reedstore::pages::sorted::SortedPage;
use crate::reedstore::reedstream::{invalid_config, ReedResult};
use crate::reedstore::tuples::layout::TupleLayout;
use crate::reedstore::tuples::manipulator::FieldManipulator;

/// Strategy for constructing a B+-tree's pages.
///
/// Every page a controller produces must be able to hold at least two
/// tuples, otherwise node splits cannot distribute their halves.
pub trait PageController {
    /// Layout of the tree's branch (index) tuples: the branch key fields
    /// followed by an int child-node-id field.
    fn branch_tuple_layout(&self) -> TupleLayout;

    /// Layout of the tree's leaf (data) tuples: the record schema.
    fn leaf_tuple_layout(&self) -> TupleLayout;

    /// Indices of the leaf columns forming the branch key. The default is
    /// the first `branch arity - 1` columns.
    fn branch_key_field_indices(&self) -> Vec<usize> {
        (0..self.branch_tuple_layout().arity().saturating_sub(1)).collect()
    }

    /// Makes a branch (index) page.
    fn make_branch_page(&self) -> ReedResult<SortedPage>;

    /// Makes a leaf (data) page.
    fn make_leaf_page(&self) -> ReedResult<SortedPage>;
}

/// Controller building plain in-memory pages.
///
/// Branch pages are sized to a fixed tuple count; leaf pages use a fixed
/// buffer size. This is the standard configuration for a primary index.
pub struct InMemoryPageController {
    leaf_layout: TupleLayout,
    branch_layout: TupleLayout,
    branch_key_field_indices: Vec<usize>,
    branch_tuple_count: usize,
    leaf_buffer_size: usize,
}

impl InMemoryPageController {
    /// Creates a controller for the given leaf schema and geometry.
    ///
    /// ## Input
    /// - `leaf_schema`: Record schema of the leaf tuples
    /// - `branch_key_field_indices`: Leaf columns forming the branch key
    /// - `branch_tuple_count`: Tuples per branch page (fanout - 1)
    /// - `leaf_buffer_size`: Byte size of each leaf page buffer
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptySchema` if the schema or key indices are empty
    /// - `ReedError::InvalidConfig` if a page geometry cannot hold at
    ///   least two tuples
    pub fn new(
        leaf_schema: &[FieldManipulator],
        branch_key_field_indices: &[usize],
        branch_tuple_count: usize,
        leaf_buffer_size: usize,
    ) -> ReedResult<Self> {
        let leaf_layout = TupleLayout::new(leaf_schema)?;

        if let Some(&index) = branch_key_field_indices
            .iter()
            .find(|&&i| i >= leaf_schema.len())
        {
            return Err(invalid_config(
                "btree::controller",
                format!(
                    "branch key column {} is outside the {}-column leaf schema",
                    index,
                    leaf_schema.len()
                ),
            ));
        }

        let mut branch_schema: Vec<FieldManipulator> = branch_key_field_indices
            .iter()
            .map(|&i| leaf_schema[i])
            .collect();
        branch_schema.push(FieldManipulator::Int);
        let branch_layout = TupleLayout::new(&branch_schema)?;

        if branch_tuple_count < 2 {
            return Err(invalid_config(
                "btree::controller",
                format!(
                    "branch pages must hold at least 2 tuples, got {}",
                    branch_tuple_count
                ),
            ));
        }

        if leaf_buffer_size / leaf_layout.size() < 2 {
            return Err(invalid_config(
                "btree::controller",
                format!(
                    "leaf buffer of {} bytes holds fewer than 2 tuples of {} bytes",
                    leaf_buffer_size,
                    leaf_layout.size()
                ),
            ));
        }

        Ok(Self {
            leaf_layout,
            branch_layout,
            branch_key_field_indices: branch_key_field_indices.to_vec(),
            branch_tuple_count,
            leaf_buffer_size,
        })
    }
}

impl PageController for InMemoryPageController {
    fn branch_tuple_layout(&self) -> TupleLayout {
        self.branch_layout.clone()
    }

    fn leaf_tuple_layout(&self) -> TupleLayout {
        self.leaf_layout.clone()
    }

    fn branch_key_field_indices(&self) -> Vec<usize> {
        self.branch_key_field_indices.clone()
    }

    fn make_branch_page(&self) -> ReedResult<SortedPage> {
        Ok(SortedPage::from_layout(
            self.branch_layout.clone(),
            self.branch_layout.size() * self.branch_tuple_count,
        ))
    }

    fn make_leaf_page(&self) -> ReedResult<SortedPage> {
        Ok(SortedPage::from_layout(
            self.leaf_layout.clone(),
            self.leaf_buffer_size,
        ))
    }
}
