// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Sorted Tuple Pages
//!
//! A sorted page is a fixed-size byte buffer holding a multiset of tuples
//! ordered by prefix comparison. Tuples live at distinct slot addresses of
//! the form `k * layout.size()` inside the buffer; a slot directory keeps
//! the addresses in prefix order (the multiset), and a free list records
//! the addresses of deleted tuples for reuse. Stored tuples are handed out
//! as immutable `TupleRef` views only, so the ordering can never be broken
//! by in-place mutation.

use crate::reedstore::compare::prefix::prefix_compare;
use crate::reedstore::keys::range::{EndpointKind, RangeKey};
use crate::reedstore::keys::value::ValueKey;
use crate::reedstore::reedstream::{page_full, ReedResult};
use crate::reedstore::tuples::backed::{TupleMut, TupleRef};
use crate::reedstore::tuples::layout::TupleLayout;
use crate::reedstore::tuples::manipulator::FieldManipulator;
use crate::reedstore::tuples::tuple::Tuple;
use std::cmp::Ordering;

/// Fixed-size page of prefix-ordered tuples.
///
/// ## Invariants
/// - The slot directory contains exactly the stored tuples, in prefix order
/// - The free list contains addresses not in the directory
/// - Every stored or free address is `k * layout.size()` for some `k`
///   below the page's high-water mark
#[derive(Debug, Clone)]
pub struct SortedPage {
    /// The memory buffer holding the tuple data. Size fixed at construction.
    buffer: Vec<u8>,

    /// The layout used to interact with the tuples in the buffer.
    layout: TupleLayout,

    /// Buffer offsets of the stored tuples, in prefix order.
    slots: Vec<usize>,

    /// Buffer offsets of deleted tuples, reusable by `add_tuple`.
    free_list: Vec<usize>,
}

impl SortedPage {
    /// Creates a page for tuples with the given schema.
    ///
    /// ## Input
    /// - `schema`: Non-empty manipulators for the fields of each tuple
    /// - `buffer_size`: Size (in bytes) of the page's buffer
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptySchema` if `schema` has no fields
    pub fn new(schema: &[FieldManipulator], buffer_size: usize) -> ReedResult<Self> {
        Ok(Self::from_layout(TupleLayout::new(schema)?, buffer_size))
    }

    /// Creates a page for tuples with the given layout.
    pub fn from_layout(layout: TupleLayout, buffer_size: usize) -> Self {
        Self {
            buffer: vec![0u8; buffer_size],
            layout,
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Gets the layout used to interact with the tuples on the page.
    pub fn layout(&self) -> &TupleLayout {
        &self.layout
    }

    /// Gets the manipulators for the fields of the tuples on the page.
    pub fn field_manipulators(&self) -> &[FieldManipulator] {
        self.layout.manipulators()
    }

    /// Gets the size (in bytes) of the page's buffer.
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Gets the number of tuples currently stored on the page.
    pub fn tuple_count(&self) -> usize {
        self.slots.len()
    }

    /// Gets the maximum number of tuples the page can store.
    pub fn max_tuple_count(&self) -> usize {
        self.buffer.len() / self.layout.size()
    }

    /// Gets the number of additional tuples that can fit on the page.
    pub fn empty_tuple_count(&self) -> usize {
        self.max_tuple_count() - self.tuple_count()
    }

    /// Gets the percentage of the page currently containing tuples (0-100).
    pub fn percentage_full(&self) -> f64 {
        self.tuple_count() as f64 * 100.0 / self.max_tuple_count() as f64
    }

    /// Gets the stored tuple at a slot-directory position (prefix order).
    pub fn tuple_at(&self, pos: usize) -> TupleRef<'_> {
        self.tuple_at_offset(self.slots[pos])
    }

    /// Iterates over the stored tuples in prefix order. Reverse iteration
    /// is available through `rev()`.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = TupleRef<'_>> + '_ {
        self.slots.iter().map(move |&offset| self.tuple_at_offset(offset))
    }

    /// Adds a tuple to the page.
    ///
    /// ## Behaviour
    /// - Reuses a free-list address when one exists, otherwise claims the
    ///   next dense slot
    /// - Copies the fields across (converting where necessary) and inserts
    ///   the address into the directory at the multiset upper bound, so
    ///   equivalent tuples keep their insertion order
    /// - A failed field conversion leaves the page unchanged
    ///
    /// ## Performance
    /// - O(log n) position search plus an O(n) directory shift
    /// - The tuple data itself is written once, never moved afterwards
    ///
    /// ## Error Conditions
    /// - `ReedError::PageFull` if the page already holds the maximum count
    /// - `ReedError::ArityMismatch` / `ReedError::TypeIncompatible` from
    ///   the field copy
    pub fn add_tuple(&mut self, tuple: &dyn Tuple) -> ReedResult<()> {
        let max = self.max_tuple_count();
        if self.tuple_count() >= max {
            return Err(page_full(self.tuple_count(), max));
        }

        let (offset, reused) = match self.free_list.last().copied() {
            Some(offset) => (offset, true),
            None => (self.tuple_count() * self.layout.size(), false),
        };

        {
            let end = offset + self.layout.size();
            let mut target = TupleMut::new(&mut self.buffer[offset..end], &self.layout);
            target.copy_from(tuple)?;
        }

        let pos = {
            let probe = self.tuple_at_offset(offset);
            self.upper_bound_tuple(&probe)?
        };

        if reused {
            self.free_list.pop();
        }
        self.slots.insert(pos, offset);
        Ok(())
    }

    /// Deletes one tuple equivalent to `tuple` from the page, if present.
    ///
    /// ## Behaviour
    /// - Location is by multiset equivalence (prefix comparison), not by
    ///   address; with duplicates, the first equivalent slot is removed and
    ///   exactly that slot's address goes to the free list
    /// - No-op when no equivalent tuple is stored
    ///
    /// ## Performance
    /// - O(log n) search plus an O(n) directory shift
    pub fn delete_tuple(&mut self, tuple: &dyn Tuple) -> ReedResult<()> {
        let pos = self.lower_bound_tuple(tuple)?;
        if pos < self.slots.len() && prefix_compare(&self.tuple_at(pos), tuple)? == Ordering::Equal
        {
            let offset = self.slots.remove(pos);
            self.free_list.push(offset);
        }
        Ok(())
    }

    /// Clears the page. The buffer size is unchanged.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }

    /// Returns the position of the first stored tuple not ordered before
    /// the probe tuple, or `tuple_count()` if all are ordered before it.
    ///
    /// Comparison converts the probe side to the stored tuples' field
    /// types (stored tuple on the left).
    pub fn lower_bound_tuple(&self, probe: &dyn Tuple) -> ReedResult<usize> {
        self.partition(|pos| Ok(prefix_compare(&self.tuple_at(pos), probe)? != Ordering::Less))
    }

    /// Returns the position of the first stored tuple ordered after the
    /// probe tuple, or `tuple_count()` if none is.
    ///
    /// Comparison converts the stored side to the probe's field types
    /// (probe on the left).
    pub fn upper_bound_tuple(&self, probe: &dyn Tuple) -> ReedResult<usize> {
        self.partition(|pos| Ok(prefix_compare(probe, &self.tuple_at(pos))? == Ordering::Less))
    }

    /// Returns the position of the first tuple not ordered before the key.
    pub fn lower_bound(&self, key: &ValueKey) -> ReedResult<usize> {
        self.lower_bound_tuple(key)
    }

    /// Returns the position one beyond the last tuple equivalent to the key.
    pub fn upper_bound(&self, key: &ValueKey) -> ReedResult<usize> {
        self.upper_bound_tuple(key)
    }

    /// Returns the pair `(lower_bound(key), upper_bound(key))`.
    pub fn equal_range(&self, key: &ValueKey) -> ReedResult<(usize, usize)> {
        Ok((self.lower_bound(key)?, self.upper_bound(key)?))
    }

    /// Returns the position of some tuple equivalent to the key, if any.
    pub fn find(&self, key: &ValueKey) -> ReedResult<Option<usize>> {
        let pos = self.lower_bound_tuple(key)?;
        if pos < self.slots.len() && prefix_compare(&self.tuple_at(pos), key)? == Ordering::Equal {
            Ok(Some(pos))
        } else {
            Ok(None)
        }
    }

    /// Returns the position of the tuple at the lower end of the range.
    ///
    /// ## Behaviour
    /// - No low endpoint: position 0
    /// - Closed low endpoint: lower bound of the endpoint value
    /// - Open low endpoint: additionally skips tuples prefix-equal to the
    ///   endpoint value
    pub fn range_lower_bound(&self, key: &RangeKey) -> ReedResult<usize> {
        match key.low() {
            None => Ok(0),
            Some(endpoint) => {
                let mut pos = self.lower_bound_tuple(endpoint.value())?;
                if endpoint.kind() == EndpointKind::Open {
                    while pos < self.slots.len()
                        && prefix_compare(&self.tuple_at(pos), endpoint.value())? == Ordering::Equal
                    {
                        pos += 1;
                    }
                }
                Ok(pos)
            }
        }
    }

    /// Returns the position one beyond the tuple at the higher end of the
    /// range.
    ///
    /// ## Behaviour
    /// - No high endpoint: `tuple_count()`
    /// - Closed high endpoint: upper bound of the endpoint value
    /// - Open high endpoint: additionally walks backwards over tuples
    ///   prefix-equal to the endpoint value, landing on the first position
    ///   whose prefix is strictly less
    pub fn range_upper_bound(&self, key: &RangeKey) -> ReedResult<usize> {
        match key.high() {
            None => Ok(self.slots.len()),
            Some(endpoint) => {
                let mut pos = self.upper_bound_tuple(endpoint.value())?;
                if endpoint.kind() == EndpointKind::Open {
                    while pos > 0
                        && prefix_compare(&self.tuple_at(pos - 1), endpoint.value())?
                            == Ordering::Equal
                    {
                        pos -= 1;
                    }
                }
                Ok(pos)
            }
        }
    }

    /// Returns the pair `(range_lower_bound(key), range_upper_bound(key))`.
    pub fn range_bounds(&self, key: &RangeKey) -> ReedResult<(usize, usize)> {
        Ok((self.range_lower_bound(key)?, self.range_upper_bound(key)?))
    }

    fn tuple_at_offset(&self, offset: usize) -> TupleRef<'_> {
        TupleRef::new(&self.buffer[offset..offset + self.layout.size()], &self.layout)
    }

    /// Binary search over the sorted directory: returns the first position
    /// satisfying `stop` (which must be monotone in prefix order), or
    /// `tuple_count()` when none does.
    fn partition<F>(&self, mut stop: F) -> ReedResult<usize>
    where
        F: FnMut(usize) -> ReedResult<bool>,
    {
        let mut lo = 0;
        let mut hi = self.slots.len();

        while lo < hi {
            let mid = (lo + hi) / 2;
            if stop(mid)? {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        Ok(lo)
    }
}

#[cfg(test)]
impl SortedPage {
    pub(crate) fn free_list_len(&self) -> usize {
        self.free_list.len()
    }

    pub(crate) fn slot_offsets(&self) -> &[usize] {
        &self.slots
    }
}
