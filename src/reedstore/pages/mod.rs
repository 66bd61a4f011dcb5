// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Page Services
//!
//! - sorted: fixed-size pages holding a prefix-ordered multiset of tuples
//! - cache: id-catalogued shared pages with pinning and a soft byte budget

pub mod cache;
pub mod sorted;

pub use cache::{PageCache, PageId, PagePersister, SharedPage};
pub use sorted::SortedPage;
