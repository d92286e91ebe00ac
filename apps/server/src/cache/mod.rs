//! Process-wide cache of search result pages
//!
//! Entries are evicted least-recently-used once `capacity` is reached and
//! expire after their TTL. Any card mutation clears the whole cache through
//! `invalidate_all`, which also bumps a generation counter so that results
//! computed before the invalidation are never inserted after it.

use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::db::search::CacheKey;
use crate::metrics;
use crate::models::SearchResultPage;

#[derive(Debug)]
struct CacheEntry {
    value: Arc<SearchResultPage>,
    created_at: Instant,
    expires_at: Instant,
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub enabled: bool,
    pub entries: usize,
    pub capacity: usize,
    pub ttl_seconds: u64,
    pub generation: u64,
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub invalidations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    invalidations: AtomicU64,
}

/// LRU + TTL cache keyed by `CacheKey`.
#[derive(Debug)]
pub struct ResultCache {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    capacity: usize,
    default_ttl: Duration,
    enabled: bool,
    generation: AtomicU64,
    counters: Counters,
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity: capacity.get(),
            default_ttl: config.ttl(),
            enabled: config.enabled,
            generation: AtomicU64::new(0),
            counters: Counters::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A poisoned lock only means another thread panicked mid-operation;
    /// the LRU itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a page, promoting it to most recently used.
    ///
    /// Expired entries are removed and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<SearchResultPage>> {
        if !self.enabled {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let now = Instant::now();
        let mut entries = self.lock();
        let expired_age = match entries.get(key) {
            Some(entry) if entry.expires_at > now => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(&entry.value));
            }
            Some(entry) => Some(now.duration_since(entry.created_at)),
            None => None,
        };

        if let Some(age) = expired_age {
            entries.pop(key);
            tracing::trace!(key = %key, age_ms = age.as_millis() as u64, "Search cache entry expired");
            self.counters.expirations.fetch_add(1, Ordering::Relaxed);
            metrics::SEARCH_CACHE_ENTRIES.set(entries.len() as i64);
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert or replace a page. `ttl` defaults to the configured TTL.
    pub fn insert(&self, key: CacheKey, value: Arc<SearchResultPage>, ttl: Option<Duration>) {
        if !self.enabled {
            return;
        }
        let mut entries = self.lock();
        self.insert_locked(&mut entries, key, value, ttl);
    }

    /// Insert only if no `invalidate_all` happened since `generation` was read.
    ///
    /// Returns whether the page was stored.
    pub fn insert_if_generation(
        &self,
        key: CacheKey,
        value: Arc<SearchResultPage>,
        ttl: Option<Duration>,
        generation: u64,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        let mut entries = self.lock();
        // Checked under the lock: invalidate_all bumps the generation while holding it.
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        self.insert_locked(&mut entries, key, value, ttl);
        true
    }

    fn insert_locked(
        &self,
        entries: &mut LruCache<CacheKey, CacheEntry>,
        key: CacheKey,
        value: Arc<SearchResultPage>,
        ttl: Option<Duration>,
    ) {
        let now = Instant::now();
        let entry = CacheEntry {
            value,
            created_at: now,
            expires_at: now + ttl.unwrap_or(self.default_ttl),
        };
        if let Some((evicted, _)) = entries.push(key.clone(), entry) {
            if evicted != key {
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                metrics::SEARCH_CACHE_EVICTIONS_TOTAL.inc();
            }
        }
        self.counters.inserts.fetch_add(1, Ordering::Relaxed);
        metrics::SEARCH_CACHE_ENTRIES.set(entries.len() as i64);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Drop every entry and start a new generation.
    pub fn invalidate_all(&self) {
        let mut entries = self.lock();
        let dropped = entries.len();
        entries.clear();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        drop(entries);

        self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
        metrics::SEARCH_CACHE_INVALIDATIONS_TOTAL.inc();
        metrics::SEARCH_CACHE_ENTRIES.set(0);
        tracing::debug!(dropped, generation, "Search cache invalidated");
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.enabled,
            entries: self.len(),
            capacity: self.capacity,
            ttl_seconds: self.default_ttl.as_secs(),
            generation: self.generation(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            inserts: self.counters.inserts.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
        }
    }
}
