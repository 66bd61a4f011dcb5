// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Range Keys
//!
//! A range key describes an interval over selected columns with up to two
//! endpoints. Each endpoint owns a value tuple and is either closed
//! (includes the value) or open (excludes it); an absent endpoint leaves
//! that side of the range unbounded. Mutable endpoint accessors create a
//! closed endpoint on demand, which keeps call sites that configure a
//! range short.

use crate::reedstore::reedstream::ReedResult;
use crate::reedstore::tuples::fresh::FreshTuple;
use crate::reedstore::tuples::layout::TupleLayout;
use crate::reedstore::tuples::manipulator::FieldManipulator;
use serde::{Deserialize, Serialize};

/// Kind of a range endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointKind {
    /// This end of the range includes the endpoint value.
    /// For example, the low end of [9,84) is closed.
    Closed,

    /// This end of the range excludes the endpoint value.
    /// For example, the high end of [9,84) is open.
    Open,
}

/// One end of a range: an owning value and its kind.
#[derive(Debug, Clone)]
pub struct RangeEndpoint {
    value: FreshTuple,
    kind: EndpointKind,
}

impl RangeEndpoint {
    /// Creates an endpoint with the given value and kind.
    pub fn new(value: FreshTuple, kind: EndpointKind) -> Self {
        Self { value, kind }
    }

    /// Gets the value at the endpoint.
    pub fn value(&self) -> &FreshTuple {
        &self.value
    }

    /// Gets the value at the endpoint, mutably.
    pub fn value_mut(&mut self) -> &mut FreshTuple {
        &mut self.value
    }

    /// Gets the kind of the endpoint.
    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    /// Gets the kind of the endpoint, mutably.
    pub fn kind_mut(&mut self) -> &mut EndpointKind {
        &mut self.kind
    }
}

/// Key for range lookups on selected columns.
#[derive(Debug, Clone)]
pub struct RangeKey {
    /// Indices of the underlying schema columns the key fields map to.
    field_indices: Vec<usize>,

    /// Layout of an endpoint value (the schema projected through the
    /// indices), used when endpoints are created on demand.
    key_layout: TupleLayout,

    /// The low end of the range (if any).
    low: Option<RangeEndpoint>,

    /// The high end of the range (if any).
    high: Option<RangeEndpoint>,
}

impl RangeKey {
    /// Creates an unbounded range key for the given schema columns.
    ///
    /// ## Error Conditions
    /// - `ReedError::EmptySchema` if either input is empty
    pub fn new(schema: &[FieldManipulator], field_indices: &[usize]) -> ReedResult<Self> {
        let key_layout = TupleLayout::project(schema, field_indices)?;
        Ok(Self {
            field_indices: field_indices.to_vec(),
            key_layout,
            low: None,
            high: None,
        })
    }

    /// Gets the arity (number of fields) of the key.
    pub fn arity(&self) -> usize {
        self.field_indices.len()
    }

    /// Gets the indices of the schema columns used for the key.
    pub fn field_indices(&self) -> &[usize] {
        &self.field_indices
    }

    /// Returns whether the range has a low endpoint.
    pub fn has_low(&self) -> bool {
        self.low.is_some()
    }

    /// Returns whether the range has a high endpoint.
    pub fn has_high(&self) -> bool {
        self.high.is_some()
    }

    /// Gets the low endpoint (if any).
    pub fn low(&self) -> Option<&RangeEndpoint> {
        self.low.as_ref()
    }

    /// Gets the high endpoint (if any).
    pub fn high(&self) -> Option<&RangeEndpoint> {
        self.high.as_ref()
    }

    /// Clears the low endpoint of the range.
    pub fn clear_low(&mut self) {
        self.low = None;
    }

    /// Clears the high endpoint of the range.
    pub fn clear_high(&mut self) {
        self.high = None;
    }

    /// Gets the low endpoint value, creating a closed endpoint if absent.
    pub fn low_value_mut(&mut self) -> &mut FreshTuple {
        let layout = self.key_layout.clone();
        self.low
            .get_or_insert_with(|| RangeEndpoint::new(FreshTuple::new(layout), EndpointKind::Closed))
            .value_mut()
    }

    /// Gets the low endpoint kind, creating a closed endpoint if absent.
    pub fn low_kind_mut(&mut self) -> &mut EndpointKind {
        let layout = self.key_layout.clone();
        self.low
            .get_or_insert_with(|| RangeEndpoint::new(FreshTuple::new(layout), EndpointKind::Closed))
            .kind_mut()
    }

    /// Gets the high endpoint value, creating a closed endpoint if absent.
    pub fn high_value_mut(&mut self) -> &mut FreshTuple {
        let layout = self.key_layout.clone();
        self.high
            .get_or_insert_with(|| RangeEndpoint::new(FreshTuple::new(layout), EndpointKind::Closed))
            .value_mut()
    }

    /// Gets the high endpoint kind, creating a closed endpoint if absent.
    pub fn high_kind_mut(&mut self) -> &mut EndpointKind {
        let layout = self.key_layout.clone();
        self.high
            .get_or_insert_with(|| RangeEndpoint::new(FreshTuple::new(layout), EndpointKind::Closed))
            .kind_mut()
    }
}
