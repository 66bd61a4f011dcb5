// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0
//
// == FILE PURPOSE ==
// This file: Universal result and error types for all ReedStore modules
// Architecture: Foundation layer - no dependencies on other ReedStore modules
// Error handling with ReedResult<T> pattern throughout
// Dependencies: serde for serialisation, thiserror for error handling

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard Result type for all ReedStore operations.
pub type ReedResult<T> = Result<T, ReedError>;

/// Standard Error types across all modules.
///
/// Every fallible storage operation surfaces one of these variants to the
/// caller; there is no internal recovery. Field-index bounds checks are
/// debug-only and are not represented here.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum ReedError {
    /// Attempt to build a layout, key or projection from zero fields.
    #[error("Empty schema in component '{component}': at least one field is required")]
    EmptySchema { component: String },

    /// Comparing or copying tuples whose arities differ.
    #[error("Arity mismatch during '{operation}': {left} != {right}")]
    ArityMismatch {
        operation: String,
        left: usize,
        right: usize,
    },

    /// Field conversion or comparison across incompatible scalar types.
    #[error("Cannot convert field value from '{from}' to '{to}'")]
    TypeIncompatible { from: String, to: String },

    /// Adding a tuple to a page that is already full.
    #[error("Page is full: {tuple_count} of {max_tuple_count} tuples in use")]
    PageFull {
        tuple_count: usize,
        max_tuple_count: usize,
    },

    /// An id that is not known to the component handling it.
    #[error("Unknown id {id} in component '{component}'")]
    UnknownId { id: i32, component: String },

    /// Registering a page persister whose target is already mapped.
    #[error("Persistence target '{target}' is already mapped to a cached page")]
    DuplicatePersistenceTarget { target: String },

    /// Pin, unpin or flush of a page that has no persister.
    #[error("Page {id} is not persistable")]
    NotPersistable { id: i32 },

    /// Invalid component configuration (e.g. degenerate page geometry).
    #[error("Invalid configuration for '{component}': {reason}")]
    InvalidConfig { component: String, reason: String },

    /// A bulk-load input page without tuples (no separator can be built).
    #[error("Bulk-load page {index} is empty")]
    EmptyPage { index: usize },

    /// I/O error surfaced from a stream operation.
    #[error("I/O error during '{operation}': {reason}")]
    IoError { operation: String, reason: String },
}

// == CONVENIENCE FUNCTIONS ==

/// Creates an EmptySchema error.
pub fn empty_schema(component: impl Into<String>) -> ReedError {
    ReedError::EmptySchema {
        component: component.into(),
    }
}

/// Creates an ArityMismatch error.
pub fn arity_mismatch(operation: impl Into<String>, left: usize, right: usize) -> ReedError {
    ReedError::ArityMismatch {
        operation: operation.into(),
        left,
        right,
    }
}

/// Creates a TypeIncompatible error.
pub fn type_incompatible(from: impl Into<String>, to: impl Into<String>) -> ReedError {
    ReedError::TypeIncompatible {
        from: from.into(),
        to: to.into(),
    }
}

/// Creates a PageFull error.
pub fn page_full(tuple_count: usize, max_tuple_count: usize) -> ReedError {
    ReedError::PageFull {
        tuple_count,
        max_tuple_count,
    }
}

/// Creates an UnknownId error.
pub fn unknown_id(id: i32, component: impl Into<String>) -> ReedError {
    ReedError::UnknownId {
        id,
        component: component.into(),
    }
}

/// Creates a DuplicatePersistenceTarget error.
pub fn duplicate_persistence_target(target: impl Into<String>) -> ReedError {
    ReedError::DuplicatePersistenceTarget {
        target: target.into(),
    }
}

/// Creates a NotPersistable error.
pub fn not_persistable(id: i32) -> ReedError {
    ReedError::NotPersistable { id }
}

/// Creates an InvalidConfig error.
pub fn invalid_config(component: impl Into<String>, reason: impl Into<String>) -> ReedError {
    ReedError::InvalidConfig {
        component: component.into(),
        reason: reason.into(),
    }
}

/// Creates an EmptyPage error.
pub fn empty_page(index: usize) -> ReedError {
    ReedError::EmptyPage { index }
}

/// Creates an IoError.
pub fn io_error(operation: impl Into<String>, reason: impl Into<String>) -> ReedError {
    ReedError::IoError {
        operation: operation.into(),
        reason: reason.into(),
    }
}

/// Automatic conversion from std::io::Error to ReedError.
impl From<std::io::Error> for ReedError {
    fn from(err: std::io::Error) -> Self {
        ReedError::IoError {
            operation: "io".to_string(),
            reason: err.to_string(),
        }
    }
}
