// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Value Keys
//!
//! A value key is an owning tuple used for exact-value lookups, together
//! with the indices of the underlying schema columns its fields correspond
//! to. The key's layout is the schema projected through those indices, so
//! a key over columns (0,1) of an (int,double,int) schema is an
//! (int,double) tuple.

use crate::reedstore::reedstream::ReedResult;
use crate::reedstore::tuples::field::{Field, FieldMut};
use crate::reedstore::tuples::fresh::FreshTuple;
use crate::reedstore::tuples::layout::TupleLayout;
use crate::reedstore::tuples::manipulator::FieldManipulator;
use crate::reedstore::tuples::tuple::Tuple;

/// Key for exact-value lookups on selected columns.
#[derive(Debug, Clone)]
pub struct ValueKey {
    /// The owning tuple holding the key's field values.
    tuple: FreshTuple,

    /// Indices of the underlying schema columns the key fields map to.
    field_indices: Vec<usize>,
}

impl ValueKey {
    /// Creates a value key for the given schema columns.
    ///
    /// ## Input
    /// - `schema`: Non-empty manipulators of the tuples being keyed
    /// - `field_indices`: Non-empty column indices forming the key
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptySchema` if either input is empty
    pub fn new(schema: &[FieldManipulator], field_indices: &[usize]) -> ReedResult<Self> {
        let layout = TupleLayout::project(schema, field_indices)?;
        Ok(Self {
            tuple: FreshTuple::new(layout),
            field_indices: field_indices.to_vec(),
        })
    }

    /// Gets the indices of the schema columns used for the key.
    pub fn field_indices(&self) -> &[usize] {
        &self.field_indices
    }

    /// Gets the i'th key field, mutably.
    pub fn field_mut(&mut self, i: usize) -> FieldMut<'_> {
        self.tuple.field_mut(i)
    }

    /// Gets the owning tuple holding the key values.
    pub fn tuple(&self) -> &FreshTuple {
        &self.tuple
    }
}

impl Tuple for ValueKey {
    fn arity(&self) -> usize {
        self.tuple.arity()
    }

    fn field(&self, i: usize) -> Field<'_> {
        self.tuple.field(i)
    }
}
