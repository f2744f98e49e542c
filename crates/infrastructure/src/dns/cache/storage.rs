use super::{CacheKey, CacheMetrics, CacheStats, CachedAnswer, CachedEntry};
use crate::dns::record_type_map::RecordTypeMapper;
use dashmap::DashMap;
use hickory_proto::rr::{Record, RecordType};
use homedns_application::ports::{CacheInvalidator, CacheMaintenance};
use homedns_domain::DnsQuery;
use lru::LruCache;
use rustc_hash::FxBuildHasher;
use std::num::NonZeroUsize;
use std::sync::atomic::Ordering;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info};

/// TTL-aware resolution cache.
///
/// Reads and writes go through a sharded `DashMap`, so concurrent queries
/// only contend on the shard of their key. Expiry is lazy: an expired entry
/// is treated as absent on lookup and removed then, or by `sweep_expired`.
///
/// With `max_entries > 0` an LRU list bounds the number of keys; inserting
/// past the bound evicts the least recently used key. Every change to the
/// key set happens with the LRU mutex held, taken before any map shard, so
/// the list and the map always hold the same keys.
pub struct DnsCache {
    entries: DashMap<CacheKey, CachedEntry, FxBuildHasher>,
    lru: Option<Mutex<LruCache<CacheKey, ()>>>,
    max_entries: usize,
    metrics: CacheMetrics,
}

impl DnsCache {
    pub fn new(max_entries: usize) -> Self {
        info!(
            max_entries = max_entries,
            bounded = max_entries > 0,
            "Initializing DNS cache"
        );

        let lru = NonZeroUsize::new(max_entries).map(|cap| Mutex::new(LruCache::new(cap)));

        Self {
            entries: DashMap::with_capacity_and_hasher(max_entries.min(4096), FxBuildHasher),
            lru,
            max_entries,
            metrics: CacheMetrics::default(),
        }
    }

    pub fn lookup(&self, name: &str, record_type: RecordType) -> Option<CachedAnswer> {
        let key = CacheKey::new(name, record_type);
        let now = Instant::now();

        let answer = match self.entries.get(&key) {
            Some(entry) if !entry.is_expired(now) => Some(CachedAnswer::from_entry(&entry, now)),
            Some(_) => None,
            None => {
                CacheMetrics::incr(&self.metrics.misses);
                return None;
            }
        };

        match answer {
            Some(answer) => {
                self.touch(&key);
                CacheMetrics::incr(&self.metrics.hits);
                Some(answer)
            }
            None => {
                // The shard guard is released above; re-check before removing
                // in case a fresh put landed in between.
                if self.remove_key_if(&key, |entry| entry.is_expired(now)) {
                    CacheMetrics::incr(&self.metrics.expired);
                }
                CacheMetrics::incr(&self.metrics.misses);
                None
            }
        }
    }

    /// Stores an answer for `ttl` seconds. A zero TTL or an empty answer is
    /// not stored. An existing entry for the key is replaced.
    pub fn put(&self, name: &str, record_type: RecordType, records: Vec<Record>, ttl: u32) {
        if ttl == 0 || records.is_empty() {
            return;
        }

        let key = CacheKey::new(name, record_type);
        let entry = CachedEntry::new(records, ttl, Instant::now());

        let mut lru = self.lock_lru();
        self.entries.insert(key.clone(), entry);
        CacheMetrics::incr(&self.metrics.insertions);

        if let Some((old, _)) = lru.as_mut().and_then(|lru| lru.push(key.clone(), ())) {
            if old != key {
                self.entries.remove(&old);
                CacheMetrics::incr(&self.metrics.evictions);
                debug!(name = %old.name, record_type = %old.record_type, "Evicted LRU entry");
            }
        }
        drop(lru);

        debug!(name = %name, record_type = %record_type, ttl = ttl, "Cached answer");
    }

    pub fn remove(&self, name: &str, record_type: RecordType) -> bool {
        let key = CacheKey::new(name, record_type);
        let removed = self.remove_key_if(&key, |_| true);
        if removed {
            CacheMetrics::incr(&self.metrics.invalidations);
        }
        removed
    }

    pub fn remove_name(&self, name: &str) -> usize {
        let keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|entry| entry.key().name.as_ref() == name)
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in keys {
            if self.remove_key_if(&key, |_| true) {
                CacheMetrics::incr(&self.metrics.invalidations);
                removed += 1;
            }
        }
        removed
    }

    pub fn clear(&self) {
        let mut lru = self.lock_lru();
        self.entries.clear();
        if let Some(lru) = lru.as_mut() {
            lru.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let m = &self.metrics;
        CacheStats {
            entries: self.entries.len(),
            max_entries: self.max_entries,
            hits: m.hits.load(Ordering::Relaxed),
            misses: m.misses.load(Ordering::Relaxed),
            insertions: m.insertions.load(Ordering::Relaxed),
            evictions: m.evictions.load(Ordering::Relaxed),
            invalidations: m.invalidations.load(Ordering::Relaxed),
            expired: m.expired.load(Ordering::Relaxed),
            hit_rate: m.hit_rate(),
        }
    }

    fn lock_lru(&self) -> Option<MutexGuard<'_, LruCache<CacheKey, ()>>> {
        self.lru
            .as_ref()
            .map(|lru| lru.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn touch(&self, key: &CacheKey) {
        if let Some(lru) = self.lock_lru().as_mut() {
            lru.get(key);
        }
    }

    /// Removes `key` from the map and the LRU list when `predicate` holds.
    fn remove_key_if(&self, key: &CacheKey, predicate: impl FnOnce(&CachedEntry) -> bool) -> bool {
        let mut lru = self.lock_lru();
        let removed = self
            .entries
            .remove_if(key, |_, entry| predicate(entry))
            .is_some();
        if removed {
            if let Some(lru) = lru.as_mut() {
                lru.pop(key);
            }
        }
        removed
    }
}

impl CacheInvalidator for DnsCache {
    fn invalidate(&self, query: &DnsQuery) {
        let record_type = RecordTypeMapper::to_hickory(query.record_type);
        if self.remove(&query.name, record_type) {
            debug!(name = %query.name, record_type = %query.record_type, "Cache entry invalidated");
        }
    }

    fn invalidate_name(&self, name: &str) {
        let removed = self.remove_name(name);
        if removed > 0 {
            debug!(name = %name, removed = removed, "Cache entries invalidated");
        }
    }
}

impl CacheMaintenance for DnsCache {
    fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in expired {
            if self.remove_key_if(&key, |entry| entry.is_expired(now)) {
                removed += 1;
            }
        }

        self.metrics
            .expired
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
