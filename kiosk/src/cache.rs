use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::CacheConfig;

/// Thread-safe response cache bounded by both entry count and time-to-live.
///
/// Capacity is enforced by LRU eviction; staleness is checked on read, and a
/// background purge sweeps expired entries so the map does not fill with
/// dead weight between reads. Entries are immutable once written. One cache
/// is constructed per endpoint family at startup and handed to handlers
/// through `AppState`.
#[derive(Clone)]
pub struct ResponseCache<T: Clone> {
    entries: Arc<Mutex<LruCache<String, CacheEntry<T>>>>,
    ttl: Duration,
}

#[derive(Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

impl<T: Clone> ResponseCache<T> {
    /// # Panics
    /// Panics if `max_entries` is 0.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        let entries =
            LruCache::new(NonZeroUsize::new(max_entries).expect("Capacity must be non-zero"));
        Self {
            entries: Arc::new(Mutex::new(entries)),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.max_entries)
    }

    /// Returns the cached value, or `None` on a miss or an expired entry.
    /// Expired entries are removed eagerly.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    /// Store a value. If the cache is at capacity the least recently used
    /// entry is evicted.
    pub fn put(&self, key: String, value: T) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.lock().unwrap().put(key, entry);
    }

    /// Drop every expired entry. Called periodically from the background
    /// purge task.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

/// Derive a cache key from the full payload content plus a qualifier (for
/// OCR, the language selector). The digest covers the entire payload;
/// distinct inputs never share a key.
pub fn fingerprint(payload: &[u8], qualifier: &str) -> String {
    let digest = Sha256::digest(payload);
    let hex: String = digest
        .iter()
        .take(16)
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("{hex}:{qualifier}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_cache_hit_after_put() {
        let cache: ResponseCache<String> = ResponseCache::new(Duration::from_secs(60), 10);
        cache.put("k1".to_string(), "v1".to_string());
        assert_eq!(cache.get("k1"), Some("v1".to_string()));
    }

    #[test]
    fn test_cache_miss() {
        let cache: ResponseCache<String> = ResponseCache::new(Duration::from_secs(60), 10);
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn test_ttl_expiry_returns_miss() {
        let cache: ResponseCache<String> = ResponseCache::new(Duration::from_millis(10), 10);
        cache.put("k1".to_string(), "v1".to_string());
        assert_eq!(cache.get("k1"), Some("v1".to_string()));

        thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("k1"), None);
    }

    #[test]
    fn test_capacity_eviction() {
        let cache: ResponseCache<String> = ResponseCache::new(Duration::from_secs(60), 2);
        cache.put("k1".to_string(), "v1".to_string());
        cache.put("k2".to_string(), "v2".to_string());
        cache.put("k3".to_string(), "v3".to_string());

        // k1 is the least recently used entry
        assert_eq!(cache.get("k1"), None);
        assert_eq!(cache.get("k2"), Some("v2".to_string()));
        assert_eq!(cache.get("k3"), Some("v3".to_string()));
    }

    #[test]
    fn test_purge_expired_removes_only_stale_entries() {
        let cache: ResponseCache<u32> = ResponseCache::new(Duration::from_millis(10), 10);
        cache.put("stale".to_string(), 1);
        thread::sleep(Duration::from_millis(20));

        let removed = cache.purge_expired();
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_fingerprint_stability() {
        let a = fingerprint(b"same payload", "eng");
        let b = fingerprint(b"same payload", "eng");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_on_content_and_qualifier() {
        let a = fingerprint(b"payload one", "eng");
        let b = fingerprint(b"payload two", "eng");
        let c = fingerprint(b"payload one", "eng+tam");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_shared_prefix_payloads_do_not_collide() {
        // Payloads identical beyond any plausible prefix length must still
        // produce distinct keys.
        let mut one = vec![b'x'; 4096];
        let mut two = one.clone();
        one.push(b'a');
        two.push(b'b');
        assert_ne!(fingerprint(&one, "eng"), fingerprint(&two, "eng"));
    }

    #[test]
    fn test_concurrent_access() {
        let cache: ResponseCache<String> = ResponseCache::new(Duration::from_secs(60), 100);
        let mut handles = vec![];

        for i in 0..10 {
            let cache = cache.clone();
            handles.push(thread::spawn(move || {
                let key = format!("key_{i}");
                let value = format!("value_{i}");
                cache.put(key.clone(), value.clone());
                assert_eq!(cache.get(&key), Some(value));
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
