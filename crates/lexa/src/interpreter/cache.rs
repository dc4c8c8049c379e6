//! Bounded LRU cache of resolved strings.

use std::convert::Infallible;
use std::hash::{BuildHasher, RandomState};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use crate::types::ParamSnapshot;

/// Canonical identity of a resolution request.
///
/// Two requests with equal keys always produce the same text, because the
/// catalog generation pins which tree was consulted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub key: String,
    pub locale: String,
    pub fallback: Option<String>,
    pub generation: u64,
    pub params: ParamSnapshot,
}

/// Hit and miss counters plus current occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Sharded LRU mapping [`CacheKey`] to resolved text.
///
/// Each shard is an exact LRU guarded by its own mutex; requests pick a shard
/// by hash. With one shard the whole cache is an exact LRU, with more it
/// approximates one while reducing lock contention. Capacity 0 stores nothing.
#[derive(Debug)]
pub struct ResolutionCache {
    shards: Vec<Mutex<LruCache<CacheKey, String>>>,
    hasher: RandomState,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    /// Create a single-shard (exact LRU) cache.
    pub fn new(capacity: usize) -> Self {
        Self::with_shards(capacity, 1)
    }

    /// Create a cache split into `shards` independently locked LRUs.
    ///
    /// Shard sizes differ by at most one and sum to exactly `capacity`. The
    /// shard count is clamped to `1..=capacity`.
    pub fn with_shards(capacity: usize, shards: usize) -> Self {
        let shards = if capacity == 0 {
            Vec::new()
        } else {
            let count = shards.clamp(1, capacity);
            let (base, extra) = (capacity / count, capacity % count);
            (0..count)
                .map(|i| {
                    // base >= 1 because capacity >= count >= 1.
                    let size = if i < extra { base + 1 } else { base };
                    let cap = NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN);
                    Mutex::new(LruCache::new(cap))
                })
                .collect()
        };
        Self {
            shards,
            hasher: RandomState::new(),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn shard(&self, key: &CacheKey) -> Option<&Mutex<LruCache<CacheKey, String>>> {
        match self.shards.len() {
            0 => None,
            1 => self.shards.first(),
            n => {
                let hash = self.hasher.hash_one(key);
                let idx = usize::try_from(hash % n as u64).unwrap_or(0);
                self.shards.get(idx)
            }
        }
    }

    /// Look up a key, refreshing its recency on a hit.
    ///
    /// A disabled cache counts every lookup as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let found = self
            .shard(key)
            .and_then(|shard| shard.lock().get(key).cloned());
        match found {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key.key, locale = %key.locale, "resolution cache hit");
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key.key, locale = %key.locale, "resolution cache miss");
            }
        }
        found
    }

    /// Insert a value, evicting the shard's least recently used entry if full.
    pub fn insert(&self, key: CacheKey, value: String) {
        if let Some(shard) = self.shard(&key) {
            shard.lock().put(key, value);
        }
    }

    /// Return the cached value or compute, store and return it.
    pub fn get_or_compute(&self, key: CacheKey, compute: impl FnOnce() -> String) -> String {
        match self.get_or_try_compute::<Infallible>(key, || Ok(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`get_or_compute`](Self::get_or_compute).
    ///
    /// `compute` runs without holding any lock. Errors are returned as-is and
    /// nothing is cached for the key.
    pub fn get_or_try_compute<E>(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> Result<String, E>,
    ) -> Result<String, E> {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().clear();
        }
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: self.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> CacheKey {
        CacheKey {
            key: name.to_string(),
            locale: "en".to_string(),
            fallback: None,
            generation: 1,
            params: ParamSnapshot::empty(),
        }
    }

    #[test]
    fn shard_count_is_clamped_to_capacity() {
        let cache = ResolutionCache::with_shards(3, 8);
        assert_eq!(cache.shards.len(), 3);
        let cache = ResolutionCache::with_shards(16, 0);
        assert_eq!(cache.shards.len(), 1);
    }

    #[test]
    fn shard_sizes_sum_to_capacity() {
        for (capacity, shards) in [(10, 8), (16, 8), (7, 3), (1, 8), (100, 7)] {
            let cache = ResolutionCache::with_shards(capacity, shards);
            let total: usize = cache.shards.iter().map(|s| s.lock().cap().get()).sum();
            assert_eq!(total, capacity, "{capacity} over {shards} shards");
        }
    }

    #[test]
    fn generation_is_part_of_the_key() {
        let cache = ResolutionCache::new(4);
        cache.insert(key("a"), "old".to_string());
        let mut newer = key("a");
        newer.generation = 2;
        assert_eq!(cache.get(&newer), None);
        assert_eq!(cache.get(&key("a")).as_deref(), Some("old"));
    }
}
