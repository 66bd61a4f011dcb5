// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Tuple Layout
//!
//! A layout fixes how the fields of one tuple signature are arranged in a
//! raw byte buffer: the arity, the byte offset of each field (respecting
//! its alignment requirement), and the total size padded to a
//! maximum-alignment boundary so that consecutive tuples stay aligned.

use crate::reedstore::reedstream::{empty_schema, ReedResult};
use crate::reedstore::tuples::field::{Field, FieldMut};
use crate::reedstore::tuples::manipulator::FieldManipulator;
use crate::reedstore::util::alignment::AlignmentTracker;

/// Field arrangement for one tuple signature.
///
/// ## Invariants
/// - `offsets[0] == 0`; every offset is the smallest value satisfying the
///   field's alignment after the previous field
/// - `size` is a multiple of the maximum alignment and covers all fields
#[derive(Debug, Clone)]
pub struct TupleLayout {
    /// The manipulators for the fields of a target tuple, in order.
    manipulators: Vec<FieldManipulator>,

    /// The byte offset of each field from the start of a target tuple.
    offsets: Vec<usize>,

    /// The overall size (in bytes) of a target tuple, including padding.
    size: usize,
}

impl TupleLayout {
    /// Builds the layout for the given schema.
    ///
    /// ## Input
    /// - `schema`: Non-empty ordered list of field manipulators
    ///
    /// ## Output
    /// - `TupleLayout` with offsets computed via the alignment tracker
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptySchema` if `schema` has no fields
    pub fn new(schema: &[FieldManipulator]) -> ReedResult<Self> {
        if schema.is_empty() {
            return Err(empty_schema("tuples::layout"));
        }

        let mut tracker = AlignmentTracker::new();
        let mut offsets = Vec::with_capacity(schema.len());

        for manipulator in schema {
            tracker.advance_to_boundary(manipulator.alignment());
            offsets.push(tracker.offset());
            tracker.advance(manipulator.size());
        }

        // Pad so that tuples can be stored back to back in a page buffer.
        tracker.advance_to_boundary(tracker.max_alignment());

        Ok(Self {
            manipulators: schema.to_vec(),
            offsets,
            size: tracker.offset(),
        })
    }

    /// Builds a key layout by projecting a schema through field indices.
    ///
    /// ## Input
    /// - `schema`: Non-empty manipulators of the underlying tuples
    /// - `field_indices`: Non-empty indices selecting (and possibly
    ///   reordering or duplicating) schema columns
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptySchema` if either input is empty
    pub fn project(schema: &[FieldManipulator], field_indices: &[usize]) -> ReedResult<Self> {
        if schema.is_empty() || field_indices.is_empty() {
            return Err(empty_schema("tuples::layout::project"));
        }

        let projected: Vec<FieldManipulator> = field_indices
            .iter()
            .map(|&i| {
                debug_assert!(i < schema.len());
                schema[i]
            })
            .collect();

        Self::new(&projected)
    }

    /// Gets the arity (number of fields) of a target tuple.
    pub fn arity(&self) -> usize {
        self.manipulators.len()
    }

    /// Gets the overall size (in bytes) of a target tuple.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the manipulators for the fields of a target tuple.
    pub fn manipulators(&self) -> &[FieldManipulator] {
        &self.manipulators
    }

    /// Gets the byte offset of the i'th field.
    pub fn offset_of(&self, i: usize) -> usize {
        self.offsets[i]
    }

    /// Carves the i'th field of the tuple stored in `buffer`.
    ///
    /// Out-of-range field access is bounds-checked in debug builds only.
    pub fn field<'a>(&self, buffer: &'a [u8], i: usize) -> Field<'a> {
        debug_assert!(i < self.arity());
        let manipulator = self.manipulators[i];
        let offset = self.offsets[i];
        Field::new(&buffer[offset..offset + manipulator.size()], manipulator)
    }

    /// Carves the i'th field of the tuple stored in `buffer`, mutably.
    pub fn field_mut<'a>(&self, buffer: &'a mut [u8], i: usize) -> FieldMut<'a> {
        debug_assert!(i < self.arity());
        let manipulator = self.manipulators[i];
        let offset = self.offsets[i];
        FieldMut::new(
            &mut buffer[offset..offset + manipulator.size()],
            manipulator,
        )
    }
}
