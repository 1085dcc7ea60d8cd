//! Memoizing wrapper around any key function.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::sync::Cache;

use keycluster_core::config::ClusterConfig;
use keycluster_core::errors::KeyFnError;

use super::KeyFn;

/// Caches keys per value in a bounded `moka` cache so repeated clustering
/// runs over overlapping inputs compute each key once. Failures are never
/// cached.
pub struct CachedKeyFn<V, F>
where
    V: Hash + Eq + Clone + Send + Sync + 'static,
    F: KeyFn<V>,
    F::Key: Sync + 'static,
{
    inner: F,
    cache: Cache<V, F::Key>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V, F> CachedKeyFn<V, F>
where
    V: Hash + Eq + Clone + Send + Sync + 'static,
    F: KeyFn<V>,
    F::Key: Sync + 'static,
{
    /// Wrap `inner`, keeping at most `capacity` entries.
    pub fn new(inner: F, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Wrap `inner` with the configured `cache_capacity`.
    pub fn from_config(inner: F, config: &ClusterConfig) -> Self {
        Self::new(inner, config.effective_cache_capacity())
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Drop every cached key.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl<V, F> KeyFn<V> for CachedKeyFn<V, F>
where
    V: Hash + Eq + Clone + Send + Sync + 'static,
    F: KeyFn<V>,
    F::Key: Sync + 'static,
{
    type Key = F::Key;

    fn key(&self, value: &V) -> Result<F::Key, KeyFnError> {
        if let Some(key) = self.cache.get(value) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let key = self.inner.key(value)?;
        self.cache.insert(value.clone(), key.clone());
        Ok(key)
    }
}
