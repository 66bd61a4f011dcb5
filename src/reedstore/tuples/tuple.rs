// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Tuple Read Interface
//!
//! A tuple is anything that exposes an arity and per-index field access.
//! Backed, fresh and projected tuples all implement this trait, so pages,
//! comparators and the B+-tree operate on any of them interchangeably.

use crate::reedstore::tuples::field::Field;

/// Common read interface of all tuple variants.
pub trait Tuple {
    /// Gets the arity (number of fields) of the tuple. Always >= 1.
    fn arity(&self) -> usize;

    /// Gets the i'th field of the tuple.
    ///
    /// Out-of-range access is bounds-checked in debug builds only.
    fn field(&self, i: usize) -> Field<'_>;
}
