//! Response cache for rendered API bodies.
//!
//! Entries have no TTL. They live until a tag they carry is invalidated
//! (`POST /api/revalidate`), the cache is cleared, or they are evicted to
//! stay within capacity, so a cached response can be arbitrarily stale
//! until someone revalidates it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{PoisonError, RwLock};

/// Tag carried by every `GET /api/properties` entry.
pub const PROPERTIES_TAG: &str = "properties";

/// Storage for serialized responses keyed by request.
pub trait ResponseCache: Send + Sync {
    /// Returns the cached body for `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `body` under `key`, labelled with `tags`. Replaces any
    /// existing entry for the key.
    fn put(&self, key: String, body: String, tags: &[&str]);

    /// Removes every entry carrying `tag`; returns how many were removed.
    fn invalidate_tag(&self, tag: &str) -> usize;

    /// Removes everything; returns how many entries were removed.
    fn clear(&self) -> usize;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default maximum number of entries held by [`MemoryResponseCache`].
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct Entry {
    body: String,
    tags: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct Entries {
    by_key: BTreeMap<String, Entry>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<String>,
}

/// Process-local [`ResponseCache`] holding at most `capacity` entries.
///
/// Request keys are client-controlled (viewport bounds, field lists), so
/// once full the oldest entry is evicted to make room for a new key.
#[derive(Debug)]
pub struct MemoryResponseCache {
    capacity: usize,
    entries: RwLock<Entries>,
}

impl Default for MemoryResponseCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl MemoryResponseCache {
    /// Creates an empty cache with [`DEFAULT_CACHE_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache holding at most `capacity` entries (at
    /// least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(Entries::default()),
        }
    }
}

impl ResponseCache for MemoryResponseCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_key
            .get(key)
            .map(|entry| entry.body.clone())
    }

    fn put(&self, key: String, body: String, tags: &[&str]) {
        let entry = Entry {
            body,
            tags: tags.iter().map(ToString::to_string).collect(),
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.by_key.insert(key.clone(), entry).is_some() {
            return;
        }

        entries.order.push_back(key);
        while entries.by_key.len() > self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.by_key.remove(&oldest);
            log::debug!("Evicted cached response {oldest}");
        }
    }

    fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.by_key.len();
        entries.by_key.retain(|_, entry| !entry.tags.contains(tag));
        let Entries { by_key, order } = &mut *entries;
        order.retain(|key| by_key.contains_key(key));
        before - by_key.len()
    }

    fn clear(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let removed = entries.by_key.len();
        entries.by_key.clear();
        entries.order.clear();
        removed
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_key
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_get() {
        let cache = MemoryResponseCache::new();
        assert!(cache.get("a").is_none());
        cache.put("a".to_string(), "{}".to_string(), &[PROPERTIES_TAG]);
        assert_eq!(cache.get("a").as_deref(), Some("{}"));

        cache.put("a".to_string(), "[]".to_string(), &[PROPERTIES_TAG]);
        assert_eq!(cache.get("a").as_deref(), Some("[]"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_only_tagged_entries() {
        let cache = MemoryResponseCache::new();
        cache.put("a".to_string(), "1".to_string(), &[PROPERTIES_TAG]);
        cache.put("b".to_string(), "2".to_string(), &[PROPERTIES_TAG, "canada"]);
        cache.put("c".to_string(), "3".to_string(), &["glossary"]);

        assert_eq!(cache.invalidate_tag(PROPERTIES_TAG), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("c").as_deref(), Some("3"));
        assert_eq!(cache.invalidate_tag(PROPERTIES_TAG), 0);
    }

    #[test]
    fn clear_empties_everything() {
        let cache = MemoryResponseCache::new();
        cache.put("a".to_string(), "1".to_string(), &[]);
        cache.put("b".to_string(), "2".to_string(), &["x"]);
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_entries_are_evicted_at_capacity() {
        let cache = MemoryResponseCache::with_capacity(2);
        cache.put("a".to_string(), "1".to_string(), &[PROPERTIES_TAG]);
        cache.put("b".to_string(), "2".to_string(), &[PROPERTIES_TAG]);
        cache.put("a".to_string(), "1b".to_string(), &[PROPERTIES_TAG]);
        cache.put("c".to_string(), "3".to_string(), &[PROPERTIES_TAG]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").as_deref(), Some("2"));
        assert_eq!(cache.get("c").as_deref(), Some("3"));

        for i in 0..100 {
            cache.put(format!("k{i}"), String::new(), &[PROPERTIES_TAG]);
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalidated_keys_do_not_evict_live_ones() {
        let cache = MemoryResponseCache::with_capacity(2);
        cache.put("a".to_string(), "1".to_string(), &["x"]);
        cache.put("b".to_string(), "2".to_string(), &["y"]);
        assert_eq!(cache.invalidate_tag("x"), 1);

        cache.put("c".to_string(), "3".to_string(), &["y"]);
        assert_eq!(cache.get("b").as_deref(), Some("2"));
        assert_eq!(cache.get("c").as_deref(), Some("3"));
    }
}
