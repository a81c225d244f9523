use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::core::geo::TileKey;

/// Estimated memory cost of a tile payload in bytes: decoded dimensions at
/// four bytes per pixel when the payload decodes, otherwise the raw length.
/// The metric only needs to be repeatable, not exact.
pub fn estimated_cost(bytes: &[u8]) -> usize {
    match image::load_from_memory(bytes) {
        Ok(img) => (img.width() as usize) * (img.height() as usize) * 4,
        Err(_) => bytes.len(),
    }
}

struct CacheEntry {
    bytes: Arc<Vec<u8>>,
    cost: usize,
}

struct CacheInner {
    entries: LruCache<TileKey, CacheEntry>,
    capacity: usize,
    used: usize,
}

/// Cost-bounded LRU store of tile bytes.
///
/// `get` counts as a use and refreshes the entry's recency; `contains` is a
/// pure probe and never does. An entry whose own cost exceeds the capacity
/// is never stored.
pub struct MemoryCache {
    inner: Mutex<CacheInner>,
}

impl MemoryCache {
    /// Create a cache bounded to `capacity` estimated bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: LruCache::unbounded(),
                capacity,
                used: 0,
            }),
        }
    }

    /// Insert a tile, evicting least-recently-used entries until it fits.
    pub fn insert(&self, key: TileKey, bytes: Arc<Vec<u8>>) {
        let cost = estimated_cost(&bytes);
        let mut inner = self.inner.lock().expect("memory cache poisoned");
        if cost > inner.capacity {
            log::debug!("tile {key:?} cost {cost} exceeds cache capacity, not cached");
            return;
        }
        if let Some(old) = inner.entries.pop(&key) {
            inner.used -= old.cost;
        }
        while inner.used + cost > inner.capacity {
            match inner.entries.pop_lru() {
                Some((evicted_key, evicted)) => {
                    log::trace!("evicting tile {evicted_key:?} ({} bytes)", evicted.cost);
                    inner.used -= evicted.cost;
                }
                None => break,
            }
        }
        inner.entries.put(key, CacheEntry { bytes, cost });
        inner.used += cost;
    }

    /// Fetch a tile, marking it most recently used.
    pub fn get(&self, key: &TileKey) -> Option<Arc<Vec<u8>>> {
        let mut inner = self.inner.lock().ok()?;
        inner.entries.get(key).map(|entry| entry.bytes.clone())
    }

    /// Probe for a tile without touching its recency.
    pub fn contains(&self, key: &TileKey) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.entries.peek(key).is_some())
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.clear();
            inner.used = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Estimated bytes currently held.
    pub fn memory_usage(&self) -> usize {
        self.inner.lock().map(|inner| inner.used).unwrap_or(0)
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().map(|inner| inner.capacity).unwrap_or(0)
    }
}
