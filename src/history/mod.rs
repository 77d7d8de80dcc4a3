//! Correlation-ID history caches.
//!
//! # Data Flow
//! ```text
//! correlation middleware
//!     → HistoryCache::exists_or_store(id)
//!         → local.rs (LRU + TTL, one process)
//!         → kv.rs    (create-if-absent on a replicated KV store, whole fleet)
//!     → existed: bool
//! ```
//!
//! # Design Decisions
//! - Test and record happen in one atomic step; there is no separate `contains`
//! - Backends are interchangeable behind a trait object
//! - Local cache favours bounded memory over perfect recall
//! - The KV backend adds no lock of its own; the store's atomic create is the lock

pub mod kv;
pub mod local;

use async_trait::async_trait;
use thiserror::Error;

pub use kv::{KeyValueStore, KvCache, KvCreateError, MemoryKeyValue};
pub use local::{LocalCache, DEFAULT_CAPACITY, DEFAULT_TTL};

/// Boxed error used for opaque failures from handlers and stores.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a history cache backend, other than "already present".
#[derive(Debug, Error)]
#[error("{backend} history cache failed: {source}")]
pub struct CacheError {
    pub backend: &'static str,
    #[source]
    pub source: BoxError,
}

impl CacheError {
    pub fn new(backend: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            backend,
            source: source.into(),
        }
    }
}

/// An atomic "exists-or-store" key presence set.
#[async_trait]
pub trait HistoryCache: Send + Sync {
    /// Returns `true` if `id` was already recorded. Otherwise records it and
    /// returns `false`. The check and the insert are one indivisible step.
    async fn exists_or_store(&self, id: &str) -> Result<bool, CacheError>;

    /// Forget `id`.
    async fn remove(&self, id: &str) -> Result<(), CacheError>;

    /// Short backend name used in logs and metric labels.
    fn backend(&self) -> &'static str;
}
