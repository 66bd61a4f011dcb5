// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Field Views
//!
//! A field view pairs the bytes of one field with the manipulator used to
//! interact with them. `Field` is the immutable view handed out for stored
//! tuples; `FieldMut` additionally permits writes. The split makes the
//! read-only property of stored tuples a compile-time guarantee rather
//! than a runtime flag.

use crate::reedstore::reedstream::ReedResult;
use crate::reedstore::tuples::manipulator::FieldManipulator;
use std::cmp::Ordering;

/// Immutable view of a single field.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    bytes: &'a [u8],
    manipulator: FieldManipulator,
}

impl<'a> Field<'a> {
    /// Creates a field view over the given bytes.
    pub fn new(bytes: &'a [u8], manipulator: FieldManipulator) -> Self {
        debug_assert!(bytes.len() >= manipulator.size());
        Self { bytes, manipulator }
    }

    /// Returns the manipulator used to interact with this field.
    pub fn manipulator(&self) -> FieldManipulator {
        self.manipulator
    }

    /// Gets the value of this field as an int, converting where necessary.
    pub fn get_int(&self) -> ReedResult<i32> {
        self.manipulator.read_int(self.bytes)
    }

    /// Gets the value of this field as a double, converting where necessary.
    pub fn get_double(&self) -> ReedResult<f64> {
        self.manipulator.read_double(self.bytes)
    }

    /// Gets the value of this field as a display string.
    pub fn get_string(&self) -> ReedResult<String> {
        self.manipulator.read_string(self.bytes)
    }

    /// Compares this field with another.
    ///
    /// ## Behaviour
    /// - The other field's value is first converted to this field's type
    ///   (see `FieldManipulator::compare` for the asymmetry this implies)
    pub fn compare_to(&self, other: &Field<'_>) -> ReedResult<Ordering> {
        self.manipulator
            .compare(self.bytes, other.manipulator, other.bytes)
    }
}

/// Mutable view of a single field.
#[derive(Debug)]
pub struct FieldMut<'a> {
    bytes: &'a mut [u8],
    manipulator: FieldManipulator,
}

impl<'a> FieldMut<'a> {
    /// Creates a mutable field view over the given bytes.
    pub fn new(bytes: &'a mut [u8], manipulator: FieldManipulator) -> Self {
        debug_assert!(bytes.len() >= manipulator.size());
        Self { bytes, manipulator }
    }

    /// Returns the manipulator used to interact with this field.
    pub fn manipulator(&self) -> FieldManipulator {
        self.manipulator
    }

    /// Returns the immutable view of this field.
    pub fn as_field(&self) -> Field<'_> {
        Field::new(self.bytes, self.manipulator)
    }

    /// Sets this field to an int value, converting where necessary.
    pub fn set_int(&mut self, value: i32) -> ReedResult<()> {
        self.manipulator.write_int(self.bytes, value)
    }

    /// Sets this field to a double value, converting where necessary
    /// (int fields truncate toward zero).
    pub fn set_double(&mut self, value: f64) -> ReedResult<()> {
        self.manipulator.write_double(self.bytes, value)
    }

    /// Sets this field to the value of a source field, converting to this
    /// field's type first.
    pub fn set_from(&mut self, source: &Field<'_>) -> ReedResult<()> {
        self.manipulator
            .set_from(self.bytes, source.manipulator, source.bytes)
    }
}
