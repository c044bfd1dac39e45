//! ColumnCacheStore - paginated task lists per (column, search) key.
//!
//! # Design
//! - One entry per [`CacheKey`]: loaded pages, a pending ticket, stale/error flags
//! - At most one fetch in flight per key; extra requests while pending are no-ops
//! - Writes invalidate coarsely: every column-task key loses its pages
//! - The lock is never held across an `.await`, so reads stay synchronous
//!
//! # Arrival policy
//! Page 1 always replaces whatever is cached (last arrival wins). A later page is
//! appended only when it directly follows the last cached page; anything else
//! (e.g. a page 2 that lands after an invalidation) is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{CacheKey, InvalidationScope, Page, PageEnvelope, Result, Task};
use crate::ports::TaskTransport;

/// What the rendering layer needs to know about one key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub loaded_pages: usize,
    pub has_more: bool,
    pub is_fetching: bool,
    pub is_error: bool,
    pub is_stale: bool,
}

#[derive(Debug, Default)]
struct Entry {
    pages: Vec<Page>,
    /// Ticket of the fetch currently in flight.
    in_flight: Option<u64>,
    stale: bool,
    error: bool,
    /// Bumped by every invalidation.
    epoch: u64,
}

impl Entry {
    fn next_page(&self) -> Option<u32> {
        self.pages.last().and_then(|p| p.next)
    }

    fn needs_load(&self) -> bool {
        self.stale || self.pages.is_empty()
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, Entry>,
    total_count: Option<usize>,
    next_ticket: u64,
}

impl CacheState {
    /// Claim the key for a fetch. Returns `(ticket, epoch)`.
    fn begin_fetch(&mut self, key: &CacheKey) -> (u64, u64) {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let entry = self.entries.entry(key.clone()).or_default();
        entry.in_flight = Some(ticket);
        (ticket, entry.epoch)
    }
}

/// Clears the pending ticket if a fetch future is dropped before it lands.
struct PendingGuard<'a> {
    state: &'a Mutex<CacheState>,
    key: &'a CacheKey,
    ticket: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = state.entries.get_mut(self.key)
            && entry.in_flight == Some(self.ticket)
        {
            entry.in_flight = None;
        }
    }
}

/// Client-side cache of paginated column lists.
pub struct ColumnCacheStore {
    transport: Arc<dyn TaskTransport>,
    page_size: u32,
    state: Mutex<CacheState>,
}

impl ColumnCacheStore {
    pub fn new(transport: Arc<dyn TaskTransport>, page_size: u32) -> Self {
        Self {
            transport,
            page_size: page_size.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch page 1 if the key was never loaded or has been invalidated.
    ///
    /// Returns `Ok(true)` when a request was issued.
    pub async fn ensure_loaded(&self, key: &CacheKey) -> Result<bool> {
        let (ticket, epoch) = {
            let mut state = self.lock();
            let entry = state.entries.get(key);
            let pending = entry.is_some_and(|e| e.in_flight.is_some());
            let needs_load = entry.is_none_or(Entry::needs_load);
            if pending || !needs_load {
                return Ok(false);
            }
            state.begin_fetch(key)
        };
        self.fetch(key, 1, ticket, epoch).await?;
        Ok(true)
    }

    /// Fetch and append the page after the last loaded one.
    ///
    /// No-op (returns `Ok(false)`) when there is no next cursor, a fetch for
    /// the key is already pending, or the key is stale.
    pub async fn ensure_next_page(&self, key: &CacheKey) -> Result<bool> {
        let (page, ticket, epoch) = {
            let mut state = self.lock();
            let Some(entry) = state.entries.get(key) else {
                return Ok(false);
            };
            if entry.in_flight.is_some() {
                debug!(%key, "next page already pending");
                return Ok(false);
            }
            if entry.stale {
                debug!(%key, "stale key, reload page 1 first");
                return Ok(false);
            }
            let Some(page) = entry.next_page() else {
                return Ok(false);
            };
            let (ticket, epoch) = state.begin_fetch(key);
            (page, ticket, epoch)
        };
        self.fetch(key, page, ticket, epoch).await?;
        Ok(true)
    }

    async fn fetch(&self, key: &CacheKey, page: u32, ticket: u64, epoch: u64) -> Result<()> {
        let _pending = PendingGuard {
            state: &self.state,
            key,
            ticket,
        };
        debug!(%key, page, "fetching page");
        let result = self
            .transport
            .list(&key.column_id, &key.search, page, self.page_size)
            .await;

        let mut state = self.lock();
        let entry = state.entries.entry(key.clone()).or_default();
        if entry.in_flight == Some(ticket) {
            entry.in_flight = None;
        }
        match result {
            Ok(envelope) => {
                Self::land(key, entry, page, epoch, envelope);
                Ok(())
            }
            Err(err) => {
                warn!(%key, page, error = %err, "page fetch failed");
                entry.error = true;
                Err(err)
            }
        }
    }

    fn land(key: &CacheKey, entry: &mut Entry, page: u32, epoch: u64, envelope: PageEnvelope) {
        let landed = Page::from_envelope(page, envelope);
        if page == 1 {
            entry.pages = vec![landed];
            // Data requested before an invalidation stays marked stale.
            entry.stale = entry.epoch != epoch;
            entry.error = false;
            return;
        }

        let contiguous = entry.pages.len() as u32 == page - 1 && entry.next_page() == Some(page);
        if contiguous && entry.epoch == epoch {
            entry.pages.push(landed);
            entry.error = false;
        } else {
            debug!(%key, page, loaded = entry.pages.len(), "dropping non-contiguous page");
        }
    }

    /// Mark cached data outdated after a write.
    pub fn invalidate(&self, scope: InvalidationScope) {
        let mut state = self.lock();
        for entry in state.entries.values_mut() {
            entry.pages.clear();
            entry.stale = true;
            entry.error = false;
            entry.epoch += 1;
        }
        if scope.includes_count() {
            state.total_count = None;
        }
        debug!(?scope, keys = state.entries.len(), "cache invalidated");
    }

    /// Aggregate task count. A failed count query reads as 0.
    pub async fn total_count(&self) -> usize {
        if let Some(count) = self.lock().total_count {
            return count;
        }
        match self.transport.count().await {
            Ok(count) => {
                self.lock().total_count = Some(count);
                count
            }
            Err(err) => {
                warn!(error = %err, "count query failed");
                0
            }
        }
    }

    pub fn status(&self, key: &CacheKey) -> CacheStatus {
        let state = self.lock();
        let Some(entry) = state.entries.get(key) else {
            return CacheStatus::default();
        };
        CacheStatus {
            loaded_pages: entry.pages.len(),
            has_more: entry.next_page().is_some(),
            is_fetching: entry.in_flight.is_some(),
            is_error: entry.error,
            is_stale: entry.stale,
        }
    }

    /// Loaded tasks for `key`, page by page, in arrival order.
    pub fn tasks(&self, key: &CacheKey) -> Vec<Task> {
        self.lock()
            .entries
            .get(key)
            .map(|e| e.pages.iter().flat_map(|p| p.tasks.iter().cloned()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTask, TaskId};
    use crate::impls::{InMemoryTransport, Operation};
    use std::time::Duration;

    fn seeded(n: usize) -> InMemoryTransport {
        InMemoryTransport::with_tasks((1..=n).map(|i| {
            NewTask::new(format!("Task {i}"), "todo")
                .with_order(i as f64 * 1000.0)
                .into_task(TaskId::new(format!("t{i}")))
        }))
    }

    fn cache(store: &InMemoryTransport) -> ColumnCacheStore {
        ColumnCacheStore::new(Arc::new(store.clone()), 5)
    }

    #[tokio::test]
    async fn loads_first_page_once() {
        let store = seeded(7);
        let cache = cache(&store);
        let key = CacheKey::column_tasks("todo", "");

        assert!(cache.ensure_loaded(&key).await.unwrap());
        assert!(!cache.ensure_loaded(&key).await.unwrap());
        assert_eq!(store.counts().list, 1);

        let status = cache.status(&key);
        assert_eq!(status.loaded_pages, 1);
        assert!(status.has_more);
        assert_eq!(cache.tasks(&key).len(), 5);
    }

    #[tokio::test]
    async fn next_page_appends_until_exhausted() {
        let store = seeded(7);
        let cache = cache(&store);
        let key = CacheKey::column_tasks("todo", "");
        cache.ensure_loaded(&key).await.unwrap();

        let before = cache.tasks(&key);
        assert!(cache.ensure_next_page(&key).await.unwrap());
        let after = cache.tasks(&key);
        assert_eq!(after.len(), 7);
        assert_eq!(&after[..5], &before[..]);

        assert!(!cache.ensure_next_page(&key).await.unwrap());
        assert!(!cache.status(&key).has_more);
        assert_eq!(store.counts().list, 2);
    }

    #[tokio::test]
    async fn pending_key_issues_no_duplicate_request() {
        let store = seeded(7);
        let cache = Arc::new(cache(&store));
        let key = CacheKey::column_tasks("todo", "");
        cache.ensure_loaded(&key).await.unwrap();

        store.hold();
        let first = tokio::spawn({
            let cache = cache.clone();
            let key = key.clone();
            async move { cache.ensure_next_page(&key).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(cache.status(&key).is_fetching);
        assert!(!cache.ensure_next_page(&key).await.unwrap());

        store.release();
        assert!(first.await.unwrap().unwrap());
        assert_eq!(store.counts().list, 2);
        assert_eq!(cache.tasks(&key).len(), 7);
    }

    #[tokio::test]
    async fn failure_keeps_loaded_pages_and_flags_error() {
        let store = seeded(7);
        let cache = cache(&store);
        let key = CacheKey::column_tasks("todo", "");
        cache.ensure_loaded(&key).await.unwrap();

        store.fail_next(Operation::List, 1);
        assert!(cache.ensure_next_page(&key).await.is_err());

        let status = cache.status(&key);
        assert!(status.is_error);
        assert!(!status.is_fetching);
        assert_eq!(cache.tasks(&key).len(), 5);
    }

    #[tokio::test]
    async fn invalidation_discards_pages_and_reloads_on_demand() {
        let store = seeded(3);
        let cache = cache(&store);
        let key = CacheKey::column_tasks("todo", "");
        cache.ensure_loaded(&key).await.unwrap();

        cache.invalidate(InvalidationScope::ColumnTasks);
        assert!(cache.tasks(&key).is_empty());
        assert!(cache.status(&key).is_stale);

        assert!(cache.ensure_loaded(&key).await.unwrap());
        assert!(!cache.status(&key).is_stale);
        assert_eq!(cache.tasks(&key).len(), 3);
    }

    #[tokio::test]
    async fn page_landing_after_invalidation_is_dropped() {
        let store = seeded(7);
        let cache = Arc::new(cache(&store));
        let key = CacheKey::column_tasks("todo", "");
        cache.ensure_loaded(&key).await.unwrap();

        store.hold();
        let second = tokio::spawn({
            let cache = cache.clone();
            let key = key.clone();
            async move { cache.ensure_next_page(&key).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.invalidate(InvalidationScope::ColumnTasks);
        store.release();

        second.await.unwrap().unwrap();
        assert!(cache.tasks(&key).is_empty());
    }

    #[tokio::test]
    async fn first_page_requested_before_invalidation_lands_stale() {
        let store = seeded(7);
        let cache = Arc::new(cache(&store));
        let key = CacheKey::column_tasks("todo", "");

        store.hold();
        let first = tokio::spawn({
            let cache = cache.clone();
            let key = key.clone();
            async move { cache.ensure_loaded(&key).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.invalidate(InvalidationScope::ColumnTasks);
        store.release();
        assert!(first.await.unwrap().unwrap());

        let status = cache.status(&key);
        assert_eq!(status.loaded_pages, 1);
        assert!(status.is_stale);
        assert_eq!(cache.tasks(&key).len(), 5);

        // Stale pages are not extended, only reloaded.
        assert!(!cache.ensure_next_page(&key).await.unwrap());
        assert!(cache.ensure_loaded(&key).await.unwrap());
        assert!(!cache.status(&key).is_stale);
        assert_eq!(store.counts().list, 2);
    }

    #[tokio::test]
    async fn dropped_fetch_releases_the_key() {
        let store = seeded(7);
        let cache = Arc::new(cache(&store));
        let key = CacheKey::column_tasks("todo", "");
        cache.ensure_loaded(&key).await.unwrap();

        store.hold();
        let pending = tokio::spawn({
            let cache = cache.clone();
            let key = key.clone();
            async move { cache.ensure_next_page(&key).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.status(&key).is_fetching);

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert!(!cache.status(&key).is_fetching);

        store.release();
        assert!(cache.ensure_next_page(&key).await.unwrap());
        assert_eq!(cache.tasks(&key).len(), 7);
        assert_eq!(store.counts().list, 3);
    }

    #[tokio::test]
    async fn search_terms_are_cached_separately() {
        let store = seeded(7);
        let cache = cache(&store);
        let all = CacheKey::column_tasks("todo", "");
        let seven = CacheKey::column_tasks("todo", "Task 7");

        cache.ensure_loaded(&all).await.unwrap();
        cache.ensure_loaded(&seven).await.unwrap();

        assert_eq!(cache.tasks(&all).len(), 5);
        let found = cache.tasks(&seven);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "t7");
        assert_eq!(cache.status(&all).loaded_pages, 1);
    }

    #[tokio::test]
    async fn count_is_cached_and_degrades_to_zero() {
        let store = seeded(3);
        let cache = cache(&store);

        store.fail_next(Operation::Count, 1);
        assert_eq!(cache.total_count().await, 0);
        assert_eq!(cache.total_count().await, 3);
        assert_eq!(cache.total_count().await, 3);
        assert_eq!(store.counts().count, 2);

        cache.invalidate(InvalidationScope::ColumnTasks);
        assert_eq!(cache.total_count().await, 3);
        assert_eq!(store.counts().count, 2);

        cache.invalidate(InvalidationScope::ColumnTasksAndCount);
        assert_eq!(cache.total_count().await, 3);
        assert_eq!(store.counts().count, 3);
    }
}
