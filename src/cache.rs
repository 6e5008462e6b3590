// this_file: src/cache.rs
//! In-memory LRU result cache with TTL.
//!
//! Keys are BLAKE3 digests of the image content (or source URL) combined
//! with the requested metrics and edge mode. The original bytes, URLs and
//! filenames are never stored; only the one-way hash and the aggregate
//! metrics are kept. Entries expire lazily after a configurable TTL, and LRU
//! eviction keeps the cache below a configurable entry count.

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::debug;
use lru::LruCache;
use serde::Serialize;

use crate::analysis::AnalysisResult;
use crate::luminance::EdgeMode;
use crate::validate::Metric;

/// Identity of the image being analyzed: raw content bytes for uploads, the
/// normalized URL string for URL requests. Exactly one applies per request.
#[derive(Debug, Clone, Copy)]
pub enum KeySource<'a> {
    /// Raw image bytes (upload path)
    Content(&'a [u8]),
    /// Normalized source URL (URL path; lets the key exist before the fetch)
    SourceToken(&'a str),
}

/// Opaque fixed-length cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; blake3::OUT_LEN]);

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Derive the cache key for an analysis request.
///
/// Components are tagged and separated with "|" bytes so no combination of
/// (source, metrics, edge mode) strings can collide with a different
/// combination. Metric names mix in sorted order, so `{median, brightness}`
/// and `{brightness, median}` hash identically.
pub fn compute_cache_key(
    source: KeySource<'_>,
    metrics: &BTreeSet<Metric>,
    edge_mode: Option<EdgeMode>,
) -> CacheKey {
    let mut hasher = blake3::Hasher::new();
    match source {
        KeySource::Content(bytes) => {
            hasher.update(b"content");
            hasher.update(b"|");
            hasher.update(bytes);
        }
        KeySource::SourceToken(token) => {
            hasher.update(b"source");
            hasher.update(b"|");
            hasher.update(token.as_bytes());
        }
    }
    hasher.update(b"|");
    // BTreeSet iterates in Ord order, which matches alphabetical metric names
    let names: Vec<&str> = metrics.iter().map(Metric::as_str).collect();
    hasher.update(names.join(",").as_bytes());
    hasher.update(b"|");
    hasher.update(edge_mode.map(|m| m.as_str()).unwrap_or("").as_bytes());
    CacheKey(*hasher.finalize().as_bytes())
}

struct CacheEntry {
    inserted_at: Instant,
    result: AnalysisResult,
}

/// Counters for observability.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Thread-safe bounded LRU cache with TTL for analysis results.
///
/// A single mutex serializes all access; the critical section covers only
/// O(1) bookkeeping plus the clone of a small aggregate result. A capacity
/// of zero disables storage entirely while keeping the code path live.
pub struct AnalysisCache {
    inner: Mutex<Option<LruCache<CacheKey, CacheEntry>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl AnalysisCache {
    /// Create a cache bounded to `max_entries` with the given TTL.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let store = NonZeroUsize::new(max_entries).map(LruCache::new);
        Self {
            inner: Mutex::new(store),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Retrieve a cached result.
    ///
    /// A fresh entry is promoted to most-recently-used and returned as an
    /// independent copy, so callers may mutate it without affecting the
    /// stored value. An expired entry is removed as a side effect and
    /// reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<AnalysisResult> {
        let mut guard = self.inner.lock().expect("analysis cache mutex poisoned");
        let cache = match guard.as_mut() {
            Some(cache) => cache,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if let Some(entry) = cache.get(key) {
            if entry.inserted_at.elapsed() <= self.ttl {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.result.clone());
            }
            // Expired: remove and report a miss
            cache.pop(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a result, stamped with the current monotonic clock.
    ///
    /// Re-inserting an existing key moves it to most-recently-used and
    /// resets its TTL: analysis is deterministic, so re-caching is a
    /// refresh, not a conflict. When the insert pushes the map over
    /// capacity, exactly one least-recently-used entry is evicted.
    pub fn insert(&self, key: CacheKey, result: AnalysisResult) {
        let mut guard = self.inner.lock().expect("analysis cache mutex poisoned");
        if let Some(cache) = guard.as_mut() {
            let entry = CacheEntry {
                inserted_at: Instant::now(),
                result,
            };
            if let Some((displaced, _)) = cache.push(key, entry) {
                if displaced != key {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!("Evicted least-recently-used cache entry {}", displaced);
                }
            }
        }
    }

    /// Remove all entries.
    pub fn clear(&self) {
        if let Some(cache) = self
            .inner
            .lock()
            .expect("analysis cache mutex poisoned")
            .as_mut()
        {
            cache.clear();
        }
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("analysis cache mutex poisoned")
            .as_ref()
            .map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current stats snapshot.
    pub fn stats(&self) -> CacheStats {
        let guard = self.inner.lock().expect("analysis cache mutex poisoned");
        let (entries, capacity) = match guard.as_ref() {
            Some(cache) => (cache.len(), cache.cap().get()),
            None => (0, 0),
        };
        CacheStats {
            entries,
            capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
