//! Resolved-message caching.
//!
//! Caches fully substituted messages so repeated errors for the same field
//! and parameters skip catalog lookup and formatting.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Configuration for the message cache.
#[derive(Debug, Clone)]
pub struct MessageCacheConfig {
    /// Maximum number of entries in the cache.
    pub max_entries: usize,
    /// Time-to-live for cached messages.
    pub ttl: Duration,
}

impl Default for MessageCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl MessageCacheConfig {
    /// Create a production cache configuration.
    pub fn production() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }

    /// Create a development cache configuration.
    pub fn development() -> Self {
        Self {
            max_entries: 500,
            ttl: Duration::from_secs(60),
        }
    }

    /// Disable caching.
    pub fn disabled() -> Self {
        Self {
            max_entries: 0,
            ttl: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    message: String,
    created_at: Instant,
}

impl CacheEntry {
    fn new(message: String) -> Self {
        Self {
            message,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub size: usize,
    /// Number of evictions due to capacity or expiry.
    pub evictions: u64,
}

/// Bounded, TTL-expiring cache of resolved messages.
///
/// Safe to share between threads. Concurrent inserts for the same key are
/// last-write-wins.
#[derive(Debug)]
pub struct MessageCache {
    config: MessageCacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for MessageCache {
    fn default() -> Self {
        Self::new(MessageCacheConfig::default())
    }
}

impl MessageCache {
    /// Create a new message cache.
    pub fn new(config: MessageCacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Builds the cache key for a resolution request.
    pub fn key(locale: &str, message_key: &str, params_json: &str) -> String {
        format!("{locale}|{message_key}|{params_json}")
    }

    /// Get a cached message.
    pub fn get(&self, key: &str) -> Option<String> {
        if self.config.max_entries == 0 {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let entries = self.entries.read();
        if let Some(entry) = entries.get(key) {
            if !entry.is_expired(self.config.ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.message.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert a message into the cache.
    pub fn insert(&self, key: String, message: String) {
        if self.config.max_entries == 0 {
            return;
        }

        let mut entries = self.entries.write();

        if entries.len() >= self.config.max_entries && !entries.contains_key(&key) {
            self.evict_expired(&mut entries);
        }

        // Still full: drop the oldest entries.
        while entries.len() >= self.config.max_entries && !entries.contains_key(&key) {
            let Some(oldest) = Self::find_oldest(&entries) else {
                break;
            };
            entries.remove(&oldest);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        entries.insert(key, CacheEntry::new(message));
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.entries.read().len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn evict_expired(&self, entries: &mut HashMap<String, CacheEntry>) {
        let ttl = self.config.ttl;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(ttl));
        let evicted = before - entries.len();
        if evicted > 0 {
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        }
    }

    fn find_oldest(entries: &HashMap<String, CacheEntry>) -> Option<String> {
        entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(key, _)| key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn small(max_entries: usize) -> MessageCache {
        MessageCache::new(MessageCacheConfig {
            max_entries,
            ttl: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_key_format() {
        assert_eq!(
            MessageCache::key("en", "validation.too_big.string", r#"{"max":200}"#),
            r#"en|validation.too_big.string|{"max":200}"#
        );
    }

    #[test]
    fn test_cache_hit_and_miss() {
        let cache = small(10);
        let key = MessageCache::key("sv", "validation.required", "{}");

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), "Adress är obligatoriskt".to_string());
        assert_eq!(cache.get(&key).as_deref(), Some("Adress är obligatoriskt"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_cache_capacity_eviction() {
        let cache = small(2);
        cache.insert("a".to_string(), "1".to_string());
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("b".to_string(), "2".to_string());
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("c".to_string(), "3".to_string());

        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("c").as_deref(), Some("3"));
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.stats().size, 2);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = small(1);
        cache.insert("a".to_string(), "1".to_string());
        cache.insert("a".to_string(), "2".to_string());
        assert_eq!(cache.get("a").as_deref(), Some("2"));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_cache_expiry() {
        let cache = MessageCache::new(MessageCacheConfig {
            max_entries: 10,
            ttl: Duration::from_millis(1),
        });
        cache.insert("a".to_string(), "1".to_string());
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_disabled_cache() {
        let cache = MessageCache::new(MessageCacheConfig::disabled());
        cache.insert("a".to_string(), "1".to_string());
        assert!(cache.get("a").is_none());
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_concurrent_inserts_stay_bounded() {
        let cache = Arc::new(small(16));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        cache.insert(format!("{t}:{i}"), i.to_string());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.stats().size <= 16);
    }
}
