// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Field Manipulators
//!
//! A field manipulator treats the bytes at a field address as one scalar
//! type (e.g. the int manipulator reads and writes a machine 32-bit signed
//! integer). Manipulators hold no state, so the enum values themselves are
//! the single shared, process-wide instances. This separates the concerns
//! of field manipulation and field storage: storage varies, manipulation
//! of individual fields stays consistent.

use crate::reedstore::reedstream::ReedResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The closed set of field manipulators.
///
/// ## Conversion Semantics
/// - int -> double is exact
/// - double -> int truncates toward zero
/// - `compare` converts the *other* side to this manipulator's native type
///   before comparing, so comparison across types is not guaranteed to be
///   symmetric under lossy conversion (int vs double compares as ints)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldManipulator {
    /// Machine 32-bit signed integer, native endianness.
    Int,

    /// IEEE 754 64-bit floating point, native endianness.
    Double,
}

/// Well-known table of the shared manipulator instances.
pub const FIELD_MANIPULATORS: [FieldManipulator; 2] =
    [FieldManipulator::Int, FieldManipulator::Double];

impl FieldManipulator {
    /// Returns the size (in bytes) of the manipulated type.
    pub fn size(&self) -> usize {
        match self {
            Self::Int => std::mem::size_of::<i32>(),
            Self::Double => std::mem::size_of::<f64>(),
        }
    }

    /// Returns the alignment boundary (in bytes) required for fields of the
    /// manipulated type.
    pub fn alignment(&self) -> usize {
        match self {
            Self::Int => std::mem::align_of::<i32>(),
            Self::Double => std::mem::align_of::<f64>(),
        }
    }

    /// Returns the manipulator's type name for error reporting.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Double => "double",
        }
    }

    /// Reads the field at `bytes` as an int, converting where necessary.
    ///
    /// ## Behaviour
    /// - Double fields truncate toward zero
    ///
    /// ## Performance
    /// - O(1) native-endian read, no allocation
    ///
    /// ## Error Conditions
    /// - `ReedError::TypeIncompatible` for future types without an int view
    pub fn read_int(&self, bytes: &[u8]) -> ReedResult<i32> {
        match self {
            Self::Int => Ok(raw_int(bytes)),
            Self::Double => Ok(raw_double(bytes) as i32),
        }
    }

    /// Reads the field at `bytes` as a double, converting where necessary.
    pub fn read_double(&self, bytes: &[u8]) -> ReedResult<f64> {
        match self {
            Self::Int => Ok(raw_int(bytes) as f64),
            Self::Double => Ok(raw_double(bytes)),
        }
    }

    /// Reads the field at `bytes` as its display string.
    pub fn read_string(&self, bytes: &[u8]) -> ReedResult<String> {
        match self {
            Self::Int => Ok(raw_int(bytes).to_string()),
            Self::Double => Ok(raw_double(bytes).to_string()),
        }
    }

    /// Writes an int value to the field at `bytes`, converting where
    /// necessary.
    pub fn write_int(&self, bytes: &mut [u8], value: i32) -> ReedResult<()> {
        match self {
            Self::Int => put_int(bytes, value),
            Self::Double => put_double(bytes, value as f64),
        }
        Ok(())
    }

    /// Writes a double value to the field at `bytes`, converting where
    /// necessary (int fields truncate toward zero).
    pub fn write_double(&self, bytes: &mut [u8], value: f64) -> ReedResult<()> {
        match self {
            Self::Int => put_int(bytes, value as i32),
            Self::Double => put_double(bytes, value),
        }
        Ok(())
    }

    /// Compares the field at `bytes` with the field at `other_bytes`.
    ///
    /// ## Behaviour
    /// - The other side is first converted to this manipulator's native
    ///   type; an int manipulator compared against a double field therefore
    ///   truncates the double and compares as ints
    ///
    /// ## Output
    /// - `Ordering` of this field relative to the other
    ///
    /// ## Error Conditions
    /// - `ReedError::TypeIncompatible` when the conversion fails
    pub fn compare(
        &self,
        bytes: &[u8],
        other: FieldManipulator,
        other_bytes: &[u8],
    ) -> ReedResult<Ordering> {
        match self {
            Self::Int => {
                let lhs = raw_int(bytes);
                let rhs = other.read_int(other_bytes)?;
                Ok(lhs.cmp(&rhs))
            }
            Self::Double => {
                let lhs = raw_double(bytes);
                let rhs = other.read_double(other_bytes)?;
                Ok(lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal))
            }
        }
    }

    /// Sets the field at `bytes` from the source field, converting to this
    /// manipulator's native type first.
    pub fn set_from(
        &self,
        bytes: &mut [u8],
        source: FieldManipulator,
        source_bytes: &[u8],
    ) -> ReedResult<()> {
        match self {
            Self::Int => self.write_int(bytes, source.read_int(source_bytes)?),
            Self::Double => self.write_double(bytes, source.read_double(source_bytes)?),
        }
    }
}

// Raw accessors over the exact field bytes. The layout carves field slices
// of the correct size, so the length invariant holds by construction.

fn raw_int(bytes: &[u8]) -> i32 {
    debug_assert!(bytes.len() >= 4);
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    i32::from_ne_bytes(raw)
}

fn raw_double(bytes: &[u8]) -> f64 {
    debug_assert!(bytes.len() >= 8);
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    f64::from_ne_bytes(raw)
}

fn put_int(bytes: &mut [u8], value: i32) {
    debug_assert!(bytes.len() >= 4);
    bytes[..4].copy_from_slice(&value.to_ne_bytes());
}

fn put_double(bytes: &mut [u8], value: f64) {
    debug_assert!(bytes.len() >= 8);
    bytes[..8].copy_from_slice(&value.to_ne_bytes());
}
