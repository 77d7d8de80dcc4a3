//! History cache backed by a replicated key-value store.
//!
//! # Responsibilities
//! - Record correlation IDs fleet-wide with the store's create-if-absent
//! - Map "key already exists" to `existed = true`, everything else to an error
//!
//! # Design Decisions
//! - The store abstraction is a trait so tests run without a NATS server
//! - Entry expiry is the bucket's `max_age`, configured outside this module
//! - Keys must be valid for the store; invalid keys surface as cache errors

use async_nats::jetstream::kv;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

use super::{BoxError, CacheError, HistoryCache};
use crate::observability::metrics;

const BACKEND: &str = "kv";

/// Outcome of a failed create.
#[derive(Debug, Error)]
pub enum KvCreateError {
    /// The key is already present. This is the normal "seen before" path.
    #[error("key already exists")]
    AlreadyExists,

    #[error(transparent)]
    Other(BoxError),
}

/// Minimal key-value surface needed by [`KvCache`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Create `key` only if it does not exist yet.
    async fn create(&self, key: &str, value: Bytes) -> Result<(), KvCreateError>;

    async fn delete(&self, key: &str) -> Result<(), BoxError>;
}

/// JetStream KV. `create` fails with `CreateErrorKind::AlreadyExists` when the
/// key holds a live value, which is the only error read as "seen before".
/// Checked against a real server by the ignored `test_jetstream_kv_contract`.
#[async_trait]
impl KeyValueStore for kv::Store {
    async fn create(&self, key: &str, value: Bytes) -> Result<(), KvCreateError> {
        match kv::Store::create(self, key, value).await {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.kind(), kv::CreateErrorKind::AlreadyExists) => {
                Err(KvCreateError::AlreadyExists)
            }
            Err(e) => Err(KvCreateError::Other(Box::new(e))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), BoxError> {
        kv::Store::delete(self, key).await?;
        Ok(())
    }
}

/// In-memory [`KeyValueStore`] with the same create-if-absent semantics.
///
/// Used by tests and by single-node setups that want the KV code path.
#[derive(Debug, Default)]
pub struct MemoryKeyValue {
    entries: DashMap<String, Bytes>,
}

impl MemoryKeyValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValue {
    async fn create(&self, key: &str, value: Bytes) -> Result<(), KvCreateError> {
        // The entry guard holds the shard lock, so check and insert are atomic.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(_) => Err(KvCreateError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), BoxError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// History cache shared by every replica through a KV store.
pub struct KvCache<S> {
    store: S,
}

impl<S: KeyValueStore> KvCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: KeyValueStore> HistoryCache for KvCache<S> {
    #[tracing::instrument(name = "kv_cache.exists_or_store", skip(self), fields(component = "kv_cache"))]
    async fn exists_or_store(&self, id: &str) -> Result<bool, CacheError> {
        let existed = match self.store.create(id, Bytes::new()).await {
            Ok(()) => false,
            Err(KvCreateError::AlreadyExists) => true,
            Err(KvCreateError::Other(e)) => {
                tracing::error!(correlation_id = %id, error = %e, "Failed to create key in KV store");
                metrics::record_history_error(BACKEND);
                return Err(CacheError { backend: BACKEND, source: e });
            }
        };

        metrics::record_history_lookup(BACKEND, existed);
        tracing::debug!(correlation_id = %id, existed, "exists-or-store");
        Ok(existed)
    }

    #[tracing::instrument(name = "kv_cache.remove", skip(self), fields(component = "kv_cache"))]
    async fn remove(&self, id: &str) -> Result<(), CacheError> {
        self.store
            .delete(id)
            .await
            .map_err(|source| CacheError { backend: BACKEND, source })
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}
