// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Prefix Comparison
//!
//! Orders tuples by their shared field prefix. Tuples whose shared prefix
//! matches are equivalent regardless of arity, which is what makes short
//! search keys match longer stored tuples:
//!
//! (7,8) = (7,8,51) < (17) = (17,10) < (23,9) = (23,9,84)
//!
//! The comparison is a total preorder; sorted pages use it as their
//! multiset ordering, and keys of any arity probe it.

use crate::reedstore::reedstream::ReedResult;
use crate::reedstore::tuples::tuple::Tuple;
use std::cmp::Ordering;

/// Compares two tuples using prefix comparison.
///
/// ## Input
/// - `lhs`, `rhs`: Tuples of possibly different arities
///
/// ## Output
/// - `Ordering` decided by the first unequal field of the shared prefix;
///   `Equal` when the whole shared prefix matches
///
/// ## Behaviour
/// - Each field comparison converts the right-hand side to the left-hand
///   field's type (see `FieldManipulator::compare`)
///
/// ## Error Conditions
/// - `ReedError::TypeIncompatible` if corresponding field types cannot be
///   converted for comparison
pub fn prefix_compare(lhs: &dyn Tuple, rhs: &dyn Tuple) -> ReedResult<Ordering> {
    let shared = lhs.arity().min(rhs.arity());

    for i in 0..shared {
        match lhs.field(i).compare_to(&rhs.field(i))? {
            Ordering::Equal => continue,
            unequal => return Ok(unequal),
        }
    }

    Ok(Ordering::Equal)
}
