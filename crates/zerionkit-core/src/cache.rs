//! Short-TTL response cache shared by the domain services.
//!
//! Memoizes recent responses keyed by request identity. An entry is valid iff
//! `now - inserted_at < ttl`. Concurrent misses for the same key are not
//! deduplicated — each caller refetches and the last write wins, which is
//! acceptable because entries are idempotent read-throughs of one resource.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe TTL cache.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

/// Diagnostics snapshot of a cache's contents.
#[derive(Debug, Clone)]
pub struct CacheStats<K> {
    pub size: usize,
    pub keys: Vec<K>,
    /// Age of the oldest live entry.
    pub oldest: Option<Duration>,
    /// Age of the newest live entry.
    pub newest: Option<Duration>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value if a live entry exists; expired entries are
    /// dropped on access and report a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: K, value: V) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop a single entry.
    pub fn invalidate(&self, key: &K) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Drop every entry (explicit refresh).
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Introspection for diagnostics; expired entries still present are
    /// counted until their next access evicts them.
    pub fn stats(&self) -> CacheStats<K> {
        let entries = self.entries.lock().unwrap();
        let keys: Vec<K> = entries.keys().cloned().collect();
        let ages: Vec<Duration> = entries.values().map(|e| e.inserted_at.elapsed()).collect();
        CacheStats {
            size: entries.len(),
            keys,
            oldest: ages.iter().max().copied(),
            newest: ages.iter().min().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn hit_within_ttl_miss_after_expiry() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_millis(40));
        cache.set("chains", 7);
        assert_eq!(cache.get(&"chains"), Some(7));

        sleep(Duration::from_millis(60));
        assert_eq!(cache.get(&"chains"), None);
        // expired entry was evicted on access
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_single_key() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        cache.set("a".into(), 1);
        cache.set("b".into(), 2);
        cache.invalidate(&"a".to_string());
        assert_eq!(cache.get(&"a".to_string()), None);
        assert_eq!(cache.get(&"b".to_string()), Some(2));
    }

    #[test]
    fn clear_drops_everything() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_secs(60));
        cache.set(1, 1);
        cache.set(2, 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn stats_reports_keys_and_ages() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        cache.set("old", 1);
        sleep(Duration::from_millis(20));
        cache.set("new", 2);

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        assert!(stats.keys.contains(&"old") && stats.keys.contains(&"new"));
        assert!(stats.oldest.unwrap() >= stats.newest.unwrap());
    }

    #[test]
    fn last_write_wins_on_racing_populates() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        cache.set("k", 1);
        cache.set("k", 2);
        assert_eq!(cache.get(&"k"), Some(2));
    }
}
