use anyhow::Result as Fallible;
use parking_lot::RwLock;
use sa_core::cache::CacheStore;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// A process-local cache store with expiring entries.
///
/// Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not yet expired.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all expired entries.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let len_before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        let purged = len_before - entries.len();
        if purged > 0 {
            log::debug!("Purged {purged} expired cache entries");
        }
        purged
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl CacheStore for InMemoryCache {
    fn get(&self, key: &str) -> Fallible<Option<Value>> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .get(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.value.clone()))
    }

    fn set(&self, key: &str, value: Value, timeout: Duration) -> Fallible<()> {
        let Some(expires_at) = Instant::now().checked_add(timeout) else {
            anyhow::bail!("Invalid cache timeout: {timeout:?}");
        };
        self.entries
            .write()
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    fn delete(&self, key: &str) -> Fallible<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn delete_many(&self, keys: &[String]) -> Fallible<()> {
        let mut entries = self.entries.write();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_and_delete() {
        let cache = InMemoryCache::new();
        cache
            .set("a", json!({"x": 1}), Duration::from_secs(60))
            .unwrap();
        cache.set("b", json!(2), Duration::from_secs(60)).unwrap();
        assert_eq!(Some(json!({"x": 1})), cache.get("a").unwrap());
        cache.delete("a").unwrap();
        assert_eq!(None, cache.get("a").unwrap());
        cache.delete_many(&["b".to_string(), "c".to_string()]).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn expired_entries_are_invisible() {
        let cache = InMemoryCache::new();
        cache.set("a", json!(1), Duration::ZERO).unwrap();
        cache.set("b", json!(2), Duration::from_secs(60)).unwrap();
        assert_eq!(None, cache.get("a").unwrap());
        assert_eq!(1, cache.len());
        assert_eq!(1, cache.purge_expired());
        assert_eq!(Some(json!(2)), cache.get("b").unwrap());
    }

    #[test]
    fn clones_share_their_entries() {
        let cache = InMemoryCache::new();
        let other = cache.clone();
        cache.set("a", json!(1), Duration::from_secs(60)).unwrap();
        assert_eq!(Some(json!(1)), other.get("a").unwrap());
        other.clear();
        assert_eq!(None, cache.get("a").unwrap());
    }
}
