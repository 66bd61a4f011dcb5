// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Unique Integer ID Allocation
//!
//! Manages allocation of unique non-negative ids, e.g. for B+-tree nodes
//! or pages in a cache. Deallocated ids are reused in ascending order, so
//! allocation stays dense when there are no holes.

use crate::reedstore::reedstream::{unknown_id, ReedResult};
use std::collections::BTreeSet;

/// Allocates unique integer ids with reuse of deallocated ones.
///
/// ## Behaviour
/// - `allocate` returns the smallest free id, or `|used|` when none are free
/// - `deallocate` of the current maximum trims the free set down to the new
///   maximum, so the dense-allocation property is restored
/// - `free` and `used` stay disjoint after every operation
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    /// Ids that have been deallocated and can be handed out again.
    free: BTreeSet<i32>,

    /// Ids currently in use.
    used: BTreeSet<i32>,
}

impl IdAllocator {
    /// Creates an allocator with no ids in use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id.
    ///
    /// ## Output
    /// - `i32`: The smallest reusable id, or the next dense id
    ///
    /// ## Performance
    /// - O(log n) set operations
    pub fn allocate(&mut self) -> i32 {
        let n = match self.free.iter().next().copied() {
            Some(id) => {
                self.free.remove(&id);
                id
            }
            None => self.used.len() as i32,
        };

        self.used.insert(n);
        n
    }

    /// Deallocates the given id.
    ///
    /// ## Input
    /// - `n`: An id previously returned by `allocate`
    ///
    /// ## Behaviour
    /// - Releasing the current maximum erases all free ids above the new
    ///   maximum, so they are never handed out ahead of denser ids
    /// - Releasing any other id adds it to the free set
    ///
    /// ## Error Conditions
    /// - Returns `ReedError::UnknownId` if `n` is not currently in use
    pub fn deallocate(&mut self, n: i32) -> ReedResult<()> {
        if !self.used.remove(&n) {
            return Err(unknown_id(n, "util::ids"));
        }

        if n > self.max_used() {
            let max = self.max_used();
            self.free.retain(|&id| id <= max);
        } else {
            self.free.insert(n);
        }

        Ok(())
    }

    /// Resets the allocator, deallocating every id.
    pub fn reset(&mut self) {
        self.free.clear();
        self.used.clear();
    }

    /// Returns the number of ids currently in use.
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Returns the maximum id currently in use, or -1 when none are.
    fn max_used(&self) -> i32 {
        self.used.iter().next_back().copied().unwrap_or(-1)
    }
}
