// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Tuple Comparison Services
//!
//! - prefix: stateless prefix comparison over tuples of any arities
//! - columns: configurable multi-column comparison with sort directions

pub mod columns;
pub mod prefix;

pub use columns::{SortDirection, TupleComparator};
pub use prefix::prefix_compare;
