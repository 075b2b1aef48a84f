//! Result cache
//!
//! Memoizes committed query results by a key derived from the query
//! parameters. The map grows without bound; callers bound it by clearing.

mod entry;
mod key;

pub use entry::*;
pub use key::*;

use std::sync::Arc;

use dashmap::DashMap;

/// An in-memory map from [`CacheKey`] to [`CacheEntry`].
///
/// All operations are synchronous and immediately visible to later lookups.
///
/// # Example
///
/// ```
/// use datagrid_lib::cache::{CacheEntry, CacheKey, ResultCache};
/// use datagrid_lib::model::TableState;
///
/// let cache = ResultCache::new();
/// let key = CacheKey::new("page-0");
///
/// cache.put(key.clone(), CacheEntry::capture(&TableState::default()));
/// assert!(cache.get(&key).is_some());
///
/// cache.clear();
/// assert!(cache.get(&key).is_none());
/// ```
#[derive(Debug, Default)]
pub struct ResultCache {
    store: DashMap<CacheKey, Arc<CacheEntry>>,
}

impl ResultCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Creates a new cache with the specified initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: DashMap::with_capacity(capacity),
        }
    }

    /// Retrieves the entry stored under `key`.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.store.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Stores `entry` under `key`, replacing any previous entry.
    pub fn put(&self, key: CacheKey, entry: CacheEntry) {
        self.store.insert(key, Arc::new(entry));
    }

    /// Returns `true` if an entry exists for `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.store.contains_key(key)
    }

    /// Removes the entry stored under `key`.
    pub fn remove(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.store.remove(key).map(|(_, entry)| entry)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Returns the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableState;

    #[test]
    fn test_put_replaces_previous_entry() {
        let cache = ResultCache::new();
        let key = CacheKey::new("k");
        let mut state = TableState::default();

        cache.put(key.clone(), CacheEntry::capture(&state));
        state.search = "second".into();
        cache.put(key.clone(), CacheEntry::capture(&state));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).map(|e| e.search().to_string()), Some("second".into()));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = ResultCache::with_capacity(4);
        let state = TableState::default();
        cache.put("a".into(), CacheEntry::capture(&state));
        cache.put("b".into(), CacheEntry::capture(&state));

        assert!(cache.remove(&"a".into()).is_some());
        assert!(!cache.contains(&"a".into()));
        assert!(cache.contains(&"b".into()));

        cache.clear();
        assert!(cache.is_empty());
    }
}
