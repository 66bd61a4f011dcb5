// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Multi-Column Comparison
//!
//! A tuple comparator holds a non-empty list of (field index, direction)
//! pairs and orders equal-arity tuples by walking that list. It is a plain
//! value and imposes a strict weak order for any fixed configuration.

use crate::reedstore::reedstream::{arity_mismatch, empty_schema, ReedResult};
use crate::reedstore::tuples::tuple::Tuple;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction in which a column participates in the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Compares equal-arity tuples over configured columns.
#[derive(Debug, Clone)]
pub struct TupleComparator {
    /// The (field index, direction) pairs to compare, in order.
    columns: Vec<(usize, SortDirection)>,
}

impl TupleComparator {
    /// Creates a comparator over the given columns.
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptySchema` if `columns` is empty
    pub fn new(columns: Vec<(usize, SortDirection)>) -> ReedResult<Self> {
        if columns.is_empty() {
            return Err(empty_schema("compare::columns"));
        }

        Ok(Self { columns })
    }

    /// Creates the default comparator: all of the first `n` columns,
    /// ascending.
    pub fn make_default(n: usize) -> ReedResult<Self> {
        Self::new((0..n).map(|i| (i, SortDirection::Ascending)).collect())
    }

    /// Gets the configured columns.
    pub fn columns(&self) -> &[(usize, SortDirection)] {
        &self.columns
    }

    /// Compares two tuples over the configured columns.
    ///
    /// ## Output
    /// - `Ordering` decided by the first unequal configured column,
    ///   reversed for descending columns; `Equal` on exhaustion
    ///
    /// ## Error Conditions
    /// - `ReedError::ArityMismatch` if the tuples' arities differ
    /// - `ReedError::TypeIncompatible` if a field comparison fails
    pub fn compare(&self, lhs: &dyn Tuple, rhs: &dyn Tuple) -> ReedResult<Ordering> {
        if lhs.arity() != rhs.arity() {
            return Err(arity_mismatch("compare", lhs.arity(), rhs.arity()));
        }

        for &(index, direction) in &self.columns {
            let ordering = lhs.field(index).compare_to(&rhs.field(index))?;
            match (ordering, direction) {
                (Ordering::Equal, _) => continue,
                (unequal, SortDirection::Ascending) => return Ok(unequal),
                (unequal, SortDirection::Descending) => return Ok(unequal.reverse()),
            }
        }

        Ok(Ordering::Equal)
    }
}
