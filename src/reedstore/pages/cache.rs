// Copyright 2025 Vivian Voss. Licensed under the Apache Licence, Version 2.0.
// SPDX-Licence-Identifier: Apache-2.0

//! Page Cache
//!
//! Keeps sorted pages in memory behind integer ids. Persistable pages
//! (those with a persister) can be pinned to keep them resident and are
//! the only ones eligible to be swapped out once an eviction pass exists;
//! non-persistable pages are resident for their whole lifetime. The cache
//! tracks a soft byte budget - it aims to stay below it, it does not
//! guarantee it.
//!
//! Catalogue accesses are serialised under a mutex; reads of distinct
//! retrieved pages may proceed concurrently through their shared handles.
//! The eviction policy itself is left to a later design pass.

use crate::reedstore::pages::sorted::SortedPage;
use crate::reedstore::reedstream::{
    duplicate_persistence_target, not_persistable, unknown_id, ReedResult,
};
use crate::reedstore::util::ids::IdAllocator;
use log::trace;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Identifier of a page in the cache.
pub type PageId = i32;

/// Shared handle to a cached page.
pub type SharedPage = Arc<RwLock<SortedPage>>;

/// Loads and saves one page from/to its persistence location.
///
/// Persistence itself is outside the storage core; this trait is the seam
/// a persistent backend plugs into. `target` identifies the location so
/// the cache can refuse two pages persisted to the same place.
pub trait PagePersister: Send + Sync {
    /// Identity of the persistence location (e.g. a path).
    fn target(&self) -> String;

    /// Loads the page from the persistence location.
    fn load(&self) -> ReedResult<SortedPage>;

    /// Saves the page to the persistence location.
    fn save(&self, page: &SortedPage) -> ReedResult<()>;
}

struct CacheEntry {
    /// The resident page, if currently in memory.
    page: Option<SharedPage>,

    /// The persister for persistable pages.
    persister: Option<Arc<dyn PagePersister>>,

    /// Whether the page is pinned in memory. Non-persistable pages stay
    /// pinned for their whole lifetime.
    pinned: bool,
}

struct CacheState {
    entries: HashMap<PageId, CacheEntry>,
    targets: HashMap<String, PageId>,
    ids: IdAllocator,
    resident_bytes: usize,
}

/// Cache of sorted pages with pinning and a soft byte budget.
pub struct PageCache {
    /// Soft upper bound for the bytes of resident pages.
    max_bytes: usize,

    /// Catalogue state, serialised under a mutex.
    state: Mutex<CacheState>,
}

impl PageCache {
    /// Creates a cache aiming to keep resident pages below `max_bytes`.
    ///
    /// The bound is soft: pinned pages can push usage above it, in which
    /// case the cache simply does its best.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                targets: HashMap::new(),
                ids: IdAllocator::new(),
                resident_bytes: 0,
            }),
        }
    }

    /// Gets the soft byte budget.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Gets the bytes currently occupied by resident pages.
    pub fn resident_bytes(&self) -> usize {
        self.lock_state().resident_bytes
    }

    /// Adds a non-persistable page to the cache.
    ///
    /// ## Behaviour
    /// - The page has no persistence location, so it can never be swapped
    ///   out; it is pinned for its whole lifetime
    pub fn add_page(&self, page: SortedPage) -> PageId {
        let mut state = self.lock_state();
        let id = state.ids.allocate();
        state.resident_bytes += page.buffer_size();
        state.entries.insert(
            id,
            CacheEntry {
                page: Some(Arc::new(RwLock::new(page))),
                persister: None,
                pinned: true,
            },
        );
        trace!("cache: added non-persistable page {}", id);
        id
    }

    /// Adds a persistable page that is already in memory.
    ///
    /// ## Error Conditions
    /// - `ReedError::DuplicatePersistenceTarget` if another cached page is
    ///   persisted from/to the same target
    pub fn add_page_with_persister(
        &self,
        page: SortedPage,
        persister: Arc<dyn PagePersister>,
    ) -> ReedResult<PageId> {
        let target = persister.target();
        let mut state = self.lock_state();

        if state.targets.contains_key(&target) {
            return Err(duplicate_persistence_target(target));
        }

        let id = state.ids.allocate();
        state.resident_bytes += page.buffer_size();
        state.targets.insert(target, id);
        state.entries.insert(
            id,
            CacheEntry {
                page: Some(Arc::new(RwLock::new(page))),
                persister: Some(persister),
                pinned: true,
            },
        );
        trace!("cache: added persistable page {}", id);
        Ok(id)
    }

    /// Adds a persistable page that has not been loaded yet.
    ///
    /// ## Behaviour
    /// - The page is loaded lazily on first retrieval, not here
    /// - If the persister's target is already mapped, the existing id is
    ///   returned instead of adding a second entry
    pub fn add_lazy_page(&self, persister: Arc<dyn PagePersister>) -> PageId {
        let target = persister.target();
        let mut state = self.lock_state();

        if let Some(&id) = state.targets.get(&target) {
            return id;
        }

        let id = state.ids.allocate();
        state.targets.insert(target, id);
        state.entries.insert(
            id,
            CacheEntry {
                page: None,
                persister: Some(persister),
                pinned: false,
            },
        );
        trace!("cache: added lazy page {}", id);
        id
    }

    /// Retrieves the page with the given id, loading it if necessary.
    ///
    /// ## Performance
    /// - O(1) catalogue lookup when resident; a persister load otherwise
    ///
    /// ## Error Conditions
    /// - `ReedError::UnknownId` if the id is not in the cache
    pub fn retrieve_page(&self, id: PageId) -> ReedResult<SharedPage> {
        let mut state = self.lock_state();
        Self::resident_page(&mut state, id)
    }

    /// Pins the given persistable page, keeping it in memory. The page is
    /// loaded eagerly when not yet resident.
    ///
    /// ## Error Conditions
    /// - `ReedError::UnknownId` if the id is not in the cache
    /// - `ReedError::NotPersistable` if the page has no persister
    pub fn pin(&self, id: PageId) -> ReedResult<()> {
        let mut state = self.lock_state();
        Self::require_persistable(&state, id)?;
        Self::resident_page(&mut state, id)?;

        if let Some(entry) = state.entries.get_mut(&id) {
            entry.pinned = true;
        }
        trace!("cache: pinned page {}", id);
        Ok(())
    }

    /// Unpins the given persistable page, making it eligible for eviction.
    ///
    /// ## Error Conditions
    /// - `ReedError::UnknownId` if the id is not in the cache
    /// - `ReedError::NotPersistable` if the page has no persister
    pub fn unpin(&self, id: PageId) -> ReedResult<()> {
        let mut state = self.lock_state();
        Self::require_persistable(&state, id)?;

        if let Some(entry) = state.entries.get_mut(&id) {
            entry.pinned = false;
        }
        trace!("cache: unpinned page {}", id);
        Ok(())
    }

    /// Returns whether the given page is currently pinned.
    pub fn is_pinned(&self, id: PageId) -> ReedResult<bool> {
        let state = self.lock_state();
        let entry = state
            .entries
            .get(&id)
            .ok_or_else(|| unknown_id(id, "pages::cache"))?;
        Ok(entry.pinned)
    }

    /// Returns whether the given page is persistable.
    pub fn is_persistable(&self, id: PageId) -> ReedResult<bool> {
        let state = self.lock_state();
        let entry = state
            .entries
            .get(&id)
            .ok_or_else(|| unknown_id(id, "pages::cache"))?;
        Ok(entry.persister.is_some())
    }

    /// Flushes the given persistable page to its persistence location,
    /// provided it is currently in memory.
    ///
    /// ## Error Conditions
    /// - `ReedError::UnknownId` if the id is not in the cache
    /// - `ReedError::NotPersistable` if the page has no persister
    pub fn flush(&self, id: PageId) -> ReedResult<()> {
        let state = self.lock_state();
        let entry = state
            .entries
            .get(&id)
            .ok_or_else(|| unknown_id(id, "pages::cache"))?;

        let persister = entry
            .persister
            .as_ref()
            .ok_or_else(|| not_persistable(id))?;

        if let Some(page) = &entry.page {
            persister.save(&read_lock(page))?;
            trace!("cache: flushed page {}", id);
        }
        Ok(())
    }

    /// Removes the given page from the cache, if present.
    ///
    /// ## Input
    /// - `flush`: Whether to flush a resident persistable page first
    pub fn remove(&self, id: PageId, flush: bool) -> ReedResult<()> {
        let mut state = self.lock_state();

        let entry = match state.entries.remove(&id) {
            Some(entry) => entry,
            None => return Ok(()),
        };

        let mut flush_result = Ok(());
        if let (true, Some(persister), Some(page)) = (flush, &entry.persister, &entry.page) {
            flush_result = persister.save(&read_lock(page));
        }

        if let Some(persister) = &entry.persister {
            state.targets.remove(&persister.target());
        }
        if let Some(page) = &entry.page {
            state.resident_bytes -= read_lock(page).buffer_size();
        }
        state.ids.deallocate(id)?;
        trace!("cache: removed page {}", id);
        flush_result
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn require_persistable(state: &CacheState, id: PageId) -> ReedResult<()> {
        let entry = state
            .entries
            .get(&id)
            .ok_or_else(|| unknown_id(id, "pages::cache"))?;
        if entry.persister.is_none() {
            return Err(not_persistable(id));
        }
        Ok(())
    }

    /// Gets the shared handle for an entry, loading the page through its
    /// persister when it is not resident.
    fn resident_page(state: &mut CacheState, id: PageId) -> ReedResult<SharedPage> {
        let entry = state
            .entries
            .get_mut(&id)
            .ok_or_else(|| unknown_id(id, "pages::cache"))?;

        if let Some(page) = &entry.page {
            return Ok(Arc::clone(page));
        }

        let persister = entry
            .persister
            .as_ref()
            .ok_or_else(|| unknown_id(id, "pages::cache"))?;
        let loaded = persister.load()?;
        let bytes = loaded.buffer_size();
        let shared = Arc::new(RwLock::new(loaded));
        entry.page = Some(Arc::clone(&shared));
        state.resident_bytes += bytes;
        trace!("cache: loaded page {}", id);
        Ok(shared)
    }
}

fn read_lock(page: &SharedPage) -> std::sync::RwLockReadGuard<'_, SortedPage> {
    match page.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
