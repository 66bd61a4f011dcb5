// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Fresh Tuples
//!
//! A fresh tuple owns its own zero-initialised buffer, sized by its
//! layout. Cloning deep-copies the buffer, so fresh tuples are plain
//! values - they are what insert paths, split keys and range endpoints
//! are built from.

use crate::reedstore::reedstream::ReedResult;
use crate::reedstore::tuples::backed::{TupleMut, TupleRef};
use crate::reedstore::tuples::field::{Field, FieldMut};
use crate::reedstore::tuples::layout::TupleLayout;
use crate::reedstore::tuples::manipulator::FieldManipulator;
use crate::reedstore::tuples::tuple::Tuple;

/// Tuple backed by its own buffer.
#[derive(Debug, Clone)]
pub struct FreshTuple {
    layout: TupleLayout,
    buffer: Vec<u8>,
}

impl FreshTuple {
    /// Creates a fresh tuple with a zeroed buffer of the layout's size.
    pub fn new(layout: TupleLayout) -> Self {
        let buffer = vec![0u8; layout.size()];
        Self { layout, buffer }
    }

    /// Creates a fresh tuple for the given schema.
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptySchema` if `schema` has no fields
    pub fn from_schema(schema: &[FieldManipulator]) -> ReedResult<Self> {
        Ok(Self::new(TupleLayout::new(schema)?))
    }

    /// Gets the layout describing this tuple's fields.
    pub fn layout(&self) -> &TupleLayout {
        &self.layout
    }

    /// Gets the i'th field of the tuple, mutably.
    pub fn field_mut(&mut self, i: usize) -> FieldMut<'_> {
        self.layout.field_mut(&mut self.buffer, i)
    }

    /// Overwrites this tuple's fields with the values of a source tuple.
    pub fn copy_from(&mut self, source: &dyn Tuple) -> ReedResult<()> {
        self.as_mut().copy_from(source)
    }

    /// Returns the immutable backed view of this tuple.
    pub fn as_ref(&self) -> TupleRef<'_> {
        TupleRef::new(&self.buffer, &self.layout)
    }

    /// Returns the mutable backed view of this tuple.
    pub fn as_mut(&mut self) -> TupleMut<'_> {
        TupleMut::new(&mut self.buffer, &self.layout)
    }
}

impl Tuple for FreshTuple {
    fn arity(&self) -> usize {
        self.layout.arity()
    }

    fn field(&self, i: usize) -> Field<'_> {
        self.layout.field(&self.buffer, i)
    }
}
