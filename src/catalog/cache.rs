//! Per-class memoization of derived artifacts

use crate::error::Result;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Never-evicting cache keyed by class name, with hit/miss tracking.
///
/// The first value stored for a key wins: concurrent cold lookups may each
/// compute a value, but all of them return the one that was inserted first.
pub struct ArtifactCache<T> {
    entries: RwLock<HashMap<String, T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: Clone> ArtifactCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, computing and storing it with `init` on a miss.
    ///
    /// `init` runs without the lock held, so it may consult other caches.
    pub fn get_or_try_insert_with<F>(&self, key: &str, init: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.entries.read().get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Cache miss for '{}'", key);

        let value = init()?;

        let mut entries = self.entries.write();
        Ok(entries.entry(key.to_string()).or_insert(value).clone())
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.len(),
        }
    }
}

impl<T: Clone> Default for ArtifactCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}
