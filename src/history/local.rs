//! In-process history cache.
//!
//! # Responsibilities
//! - Remember recently seen correlation IDs
//! - Bound memory by capacity (least-recently-used first) and by TTL
//!
//! # Design Decisions
//! - One `parking_lot::Mutex` serializes every operation; atomic within this process only
//! - A hit refreshes recency but not age, so an ID always expires `ttl` after first sight
//! - Expired entries are purged lazily, when touched or when room is needed

use std::time::{Duration, Instant};

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;

use super::{CacheError, HistoryCache};
use crate::observability::metrics;

/// Default number of correlation IDs kept.
pub const DEFAULT_CAPACITY: usize = 128;

/// Default lifetime of a recorded correlation ID.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

const BACKEND: &str = "local";

/// Bounded, time-limited in-memory cache.
///
/// Entries are ordered from least to most recently used.
pub struct LocalCache {
    entries: Mutex<IndexMap<String, Instant>>,
    capacity: usize,
    ttl: Duration,
}

impl LocalCache {
    /// Create a cache. A zero capacity is bumped to one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(IndexMap::with_capacity(capacity)),
            capacity,
            ttl,
        }
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|stored| now.duration_since(**stored) < self.ttl)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn check_and_insert(&self, id: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if let Some(index) = entries.get_index_of(id) {
            let stored = entries[index];
            if now.duration_since(stored) < self.ttl {
                let last = entries.len() - 1;
                entries.move_index(index, last);
                return true;
            }
            entries.shift_remove_index(index);
        }

        if entries.len() >= self.capacity {
            entries.retain(|_, stored| now.duration_since(*stored) < self.ttl);
        }
        while entries.len() >= self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                tracing::trace!(correlation_id = %evicted, "Evicted least recently used entry");
            }
        }

        entries.insert(id.to_string(), now);
        false
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

#[async_trait]
impl HistoryCache for LocalCache {
    async fn exists_or_store(&self, id: &str) -> Result<bool, CacheError> {
        let existed = self.check_and_insert(id);
        metrics::record_history_lookup(BACKEND, existed);
        tracing::debug!(correlation_id = %id, existed, component = "local_cache", "exists-or-store");
        Ok(existed)
    }

    async fn remove(&self, id: &str) -> Result<(), CacheError> {
        self.entries.lock().shift_remove(id);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}
