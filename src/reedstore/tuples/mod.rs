// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Tuple Representation Services
//!
//! Type-erased tuples over raw byte buffers:
//! - manipulator: stateless per-type read/write/compare over field bytes
//! - field: immutable and mutable views of a single field
//! - layout: arity, per-field offsets and padded total size for a schema
//! - tuple: the common read interface
//! - backed: tuples borrowing an external buffer
//! - fresh: tuples owning their own buffer
//! - projected: virtual views selecting fields of another tuple

pub mod backed;
pub mod field;
pub mod fresh;
pub mod layout;
pub mod manipulator;
pub mod projected;
pub mod tuple;

pub use backed::{TupleMut, TupleRef};
pub use field::{Field, FieldMut};
pub use fresh::FreshTuple;
pub use layout::TupleLayout;
pub use manipulator::FieldManipulator;
pub use projected::ProjectedTuple;
pub use tuple::Tuple;

#[cfg(test)]
mod backed_test;
