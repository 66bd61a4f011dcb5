// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Projected Tuples
//!
//! A projection is a read-only virtual view over another tuple: it stores
//! an index vector and a borrow of the source, no field data of its own.
//! Indices may reorder or duplicate source fields.

use crate::reedstore::reedstream::{empty_schema, ReedResult};
use crate::reedstore::tuples::field::Field;
use crate::reedstore::tuples::tuple::Tuple;

/// Virtual tuple selecting fields of a source tuple.
pub struct ProjectedTuple<'a> {
    /// The tuple whose fields are projected.
    source: &'a dyn Tuple,

    /// Indices of the projected fields. Each must be less than the source
    /// arity; duplicates are allowed.
    indices: Vec<usize>,
}

impl<'a> ProjectedTuple<'a> {
    /// Creates a projection of `source` through `indices`.
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptySchema` if `indices` is empty
    pub fn new(source: &'a dyn Tuple, indices: Vec<usize>) -> ReedResult<Self> {
        if indices.is_empty() {
            return Err(empty_schema("tuples::projected"));
        }

        debug_assert!(indices.iter().all(|&i| i < source.arity()));
        Ok(Self { source, indices })
    }
}

impl Tuple for ProjectedTuple<'_> {
    fn arity(&self) -> usize {
        self.indices.len()
    }

    fn field(&self, i: usize) -> Field<'_> {
        debug_assert!(i < self.indices.len());
        self.source.field(self.indices[i])
    }
}
