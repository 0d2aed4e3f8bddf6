use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A bounded, thread-safe read-through cache with least-recently-used eviction.
///
/// ### Behaviour
///
/// Values are produced through [`LruCache::query`], which returns the cached
/// value when present, or otherwise calls the supplied loader. The loader runs
/// outside of the cache's lock, so concurrent misses on the same key may both
/// load. Insertion is idempotent: whichever load finishes first is kept, and
/// the later result is discarded in its favour, so the cache never holds two
/// values for one key and no result depends on the order of loads.
///
/// Values are handed out as [`Arc`]s, so eviction never invalidates a value
/// a caller is still using.
#[derive(Debug)]
pub struct LruCache<K: Hash + Eq, V> {
    entries: Mutex<lru::LruCache<K, Arc<V>>>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Debug,
{
    /// Creates a cache retaining at most `capacity` entries.
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            entries: Mutex::new(lru::LruCache::new(capacity)),
        }
    }

    /// Reads the value for `key`, loading and caching it on a miss.
    pub fn query<F>(&self, key: K, load: F) -> Arc<V>
    where
        F: FnOnce(&K) -> V,
    {
        if let Some(value) = self.lock().get(&key) {
            return Arc::clone(value);
        }

        let loaded = Arc::new(load(&key));
        self.insert(key, loaded)
    }

    /// Inserts the value unless the key is already present, returning
    /// whichever value the cache holds afterward.
    fn insert(&self, key: K, value: Arc<V>) -> Arc<V> {
        let mut entries = self.lock();
        if let Some(existing) = entries.get(&key) {
            return Arc::clone(existing);
        }

        if let Some((evicted, _)) = entries.push(key, Arc::clone(&value)) {
            log::trace!("Evicting cache entry {evicted:?}");
        }

        value
    }

    /// Whether the key is cached. Does not count as a use.
    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    // Every mutation of the inner cache completes before unlocking,
    // so a poisoned lock still guards a consistent cache.
    fn lock(&self) -> MutexGuard<'_, lru::LruCache<K, Arc<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
