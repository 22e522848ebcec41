//! Generic in-memory cache with per-entry TTL.
//!
//! Expired entries are dropped lazily on read; [`TtlCache::purge_expired`]
//! sweeps the rest for long-lived processes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store `value` under `key`. `ttl: None` keeps the entry until removed.
    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        self.set_at(key, value, ttl, Instant::now());
    }

    fn set_at(&self, key: &str, value: V, ttl: Option<Duration>, now: Instant) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                Entry {
                    value,
                    expires_at: ttl.map(|ttl| now + ttl),
                },
            );
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at.is_none_or(|at| now < at) => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|mut entries| entries.remove(key).is_some())
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at.is_none_or(|at| now < at));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_value() {
        let cache = TtlCache::new();
        cache.set("greeting", "hello".to_string(), None);
        assert_eq!(cache.get("greeting").as_deref(), Some("hello"));
        assert!(cache.has("greeting"));
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = TtlCache::new();
        let now = Instant::now();
        cache.set_at("short", 7_u32, Some(Duration::from_secs(60)), now);

        assert_eq!(cache.get_at("short", now + Duration::from_secs(59)), Some(7));
        assert_eq!(cache.get_at("short", now + Duration::from_secs(61)), None);
        // The expired entry was dropped on read.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn entry_without_ttl_never_expires() {
        let cache = TtlCache::new();
        let now = Instant::now();
        cache.set_at("pinned", 1_u32, None, now);
        assert_eq!(
            cache.get_at("pinned", now + Duration::from_secs(86_400)),
            Some(1)
        );
    }

    #[test]
    fn remove_and_clear() {
        let cache = TtlCache::new();
        cache.set("a", 1_u32, None);
        cache.set("b", 2_u32, None);

        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn purge_expired_sweeps_only_stale_entries() {
        let cache = TtlCache::new();
        let now = Instant::now();
        cache.set_at("stale", 1_u32, Some(Duration::from_secs(1)), now);
        cache.set_at("fresh", 2_u32, Some(Duration::from_secs(300)), now);
        cache.set_at("pinned", 3_u32, None, now);

        let removed = cache.purge_expired_at(now + Duration::from_secs(2));
        assert_eq!(removed, 1);
        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["fresh".to_string(), "pinned".to_string()]);
    }
}
