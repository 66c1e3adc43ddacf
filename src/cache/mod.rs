//! Caching for embeddings: a thread-safe LRU keyed by content hash.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A fixed-capacity least-recently-used cache.
///
/// `get` counts as a use and promotes the entry; `put` of an existing key
/// updates the value and promotes it. Exceeding capacity evicts the least
/// recently accessed entry. Hit/miss accounting is exact under
/// concurrency.
pub struct Lru<K, V> {
    capacity: usize,
    inner: Mutex<Inner<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    // Monotonic access clock; the entry with the smallest stamp is the
    // eviction victim.
    clock: u64,
}

struct Entry<V> {
    value: V,
    last_used: u64,
}

impl<K: Eq + Hash + Clone, V: Clone> Lru<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                entries: HashMap::with_capacity(capacity.min(1024)),
                clock: 0,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up a key, promoting it to most-recently-used on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock().unwrap();
        inner.clock += 1;
        let clock = inner.clock;
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.last_used = clock;
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Inserts or updates a key, promoting it to most-recently-used.
    pub fn put(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        inner.clock += 1;
        let clock = inner.clock;

        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.value = value;
            entry.last_used = clock;
            return;
        }

        if inner.entries.len() >= self.capacity {
            if let Some(victim) = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone())
            {
                inner.entries.remove(&victim);
            }
        }

        inner.entries.insert(
            key,
            Entry {
                value,
                last_used: clock,
            },
        );
    }

    pub fn remove(&self, key: &K) {
        self.inner.lock().unwrap().entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().entries.clear();
    }

    /// Monotonic (hits, misses) counters.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    /// Hit rate as a percentage; 0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64 * 100.0
    }
}

/// A specialized cache for text embeddings, keyed by a truncated SHA-256
/// of the content. Callers never see the hash.
pub struct EmbeddingCache {
    cache: Lru<String, Vec<f32>>,
}

impl EmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Lru::new(capacity),
        }
    }

    /// Retrieves an embedding by content. The returned vector is a copy;
    /// mutating it does not affect the cache.
    pub fn get(&self, content: &str) -> Option<Vec<f32>> {
        self.cache.get(&hash_content(content))
    }

    /// Stores a copy of an embedding by content.
    pub fn put(&self, content: &str, embedding: &[f32]) {
        self.cache.put(hash_content(content), embedding.to_vec());
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// (hits, misses, hit rate %).
    pub fn stats(&self) -> (u64, u64, f64) {
        let (hits, misses) = self.cache.stats();
        (hits, misses, self.cache.hit_rate())
    }
}

/// SHA-256 truncated to 128 bits, hex-encoded.
fn hash_content(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    hex::encode(&digest[..16])
}
