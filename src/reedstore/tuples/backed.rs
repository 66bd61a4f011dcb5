// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Backed Tuples
//!
//! Tuples whose storage lives in an external buffer owned by someone else
//! (typically a sorted page). `TupleRef` is the immutable borrow handed
//! out for stored tuples; `TupleMut` is the mutable borrow used while a
//! tuple is being written. A backed tuple never outlives its buffer - the
//! borrow checker enforces what the original design tracked with a
//! read-only flag.

use crate::reedstore::reedstream::{arity_mismatch, ReedResult};
use crate::reedstore::tuples::field::{Field, FieldMut};
use crate::reedstore::tuples::layout::TupleLayout;
use crate::reedstore::tuples::tuple::Tuple;

/// Immutable tuple view over an external buffer.
#[derive(Debug, Clone, Copy)]
pub struct TupleRef<'a> {
    bytes: &'a [u8],
    layout: &'a TupleLayout,
}

impl<'a> TupleRef<'a> {
    /// Creates a view of the tuple stored at the start of `bytes`.
    pub fn new(bytes: &'a [u8], layout: &'a TupleLayout) -> Self {
        debug_assert!(bytes.len() >= layout.size());
        Self { bytes, layout }
    }

    /// Gets the layout describing this tuple's fields.
    pub fn layout(&self) -> &TupleLayout {
        self.layout
    }
}

impl Tuple for TupleRef<'_> {
    fn arity(&self) -> usize {
        self.layout.arity()
    }

    fn field(&self, i: usize) -> Field<'_> {
        self.layout.field(self.bytes, i)
    }
}

/// Mutable tuple view over an external buffer.
#[derive(Debug)]
pub struct TupleMut<'a> {
    bytes: &'a mut [u8],
    layout: &'a TupleLayout,
}

impl<'a> TupleMut<'a> {
    /// Creates a mutable view of the tuple stored at the start of `bytes`.
    pub fn new(bytes: &'a mut [u8], layout: &'a TupleLayout) -> Self {
        debug_assert!(bytes.len() >= layout.size());
        Self { bytes, layout }
    }

    /// Gets the i'th field of the tuple, mutably.
    pub fn field_mut(&mut self, i: usize) -> FieldMut<'_> {
        self.layout.field_mut(self.bytes, i)
    }

    /// Overwrites this tuple's fields with the values of a source tuple.
    ///
    /// ## Behaviour
    /// - Field values are converted to this tuple's field types where
    ///   necessary (per-field `set_from`)
    ///
    /// ## Error Conditions
    /// - `ReedError::ArityMismatch` if the arities differ
    /// - `ReedError::TypeIncompatible` if a field conversion fails
    pub fn copy_from(&mut self, source: &dyn Tuple) -> ReedResult<()> {
        let arity = self.layout.arity();
        if source.arity() != arity {
            return Err(arity_mismatch("copy_from", arity, source.arity()));
        }

        for i in 0..arity {
            self.field_mut(i).set_from(&source.field(i))?;
        }

        Ok(())
    }
}

impl Tuple for TupleMut<'_> {
    fn arity(&self) -> usize {
        self.layout.arity()
    }

    fn field(&self, i: usize) -> Field<'_> {
        self.layout.field(self.bytes, i)
    }
}
