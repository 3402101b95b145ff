//! Decoded window cache.
//!
//! Stores keep recently decoded external windows so repeated resolution
//! of the same array does not hit the file again.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::ReadRequest;
use crate::array::Values;
use crate::util::DimVec;

/// Key for cache entries: one read window of one dataset.
#[derive(Clone, Hash, Eq, PartialEq, Debug)]
pub struct WindowKey {
    pub uri: String,
    pub path: String,
    pub start: DimVec,
    pub count: DimVec,
}

impl WindowKey {
    /// Key for the window addressed by `request`.
    pub fn from_request(request: &ReadRequest<'_>) -> Self {
        Self {
            uri: request.uri.to_string(),
            path: request.path.to_string(),
            start: DimVec::from_slice(request.start),
            count: DimVec::from_slice(request.count),
        }
    }
}

/// Approximate in-memory size of decoded values, in bytes.
pub fn approx_size(values: &Values) -> usize {
    match values {
        Values::Boolean(v) => v.len(),
        Values::Integer(v) => v.len() * 8,
        Values::Float(v) => v.len() * 8,
        Values::String(v) => v.iter().map(|s| s.len() + std::mem::size_of::<String>()).sum(),
    }
}

struct CachedWindow {
    values: Arc<Values>,
    size: usize,
}

#[derive(Default)]
struct Entries {
    windows: HashMap<WindowKey, CachedWindow>,
    /// Keys in insertion order; the front is evicted first.
    order: VecDeque<WindowKey>,
}

/// Thread-safe, size-bounded cache of decoded windows.
///
/// The byte total never exceeds `max_size`: inserting evicts the oldest
/// windows until the new one fits.
pub struct WindowCache {
    entries: RwLock<Entries>,
    /// Maximum cache size in bytes.
    max_size: usize,
    current_size: AtomicUsize,
}

impl WindowCache {
    /// Create a new cache with the given maximum size in bytes.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            max_size,
            current_size: AtomicUsize::new(0),
        }
    }

    /// Create a cache with default size (64 MB).
    pub fn default_size() -> Self {
        Self::new(64 * 1024 * 1024)
    }

    /// Get a cached window if it exists.
    #[inline]
    pub fn get(&self, key: &WindowKey) -> Option<Arc<Values>> {
        let entries = self.entries.read();
        entries.windows.get(key).map(|w| Arc::clone(&w.values))
    }

    /// Insert a decoded window. Windows larger than the whole budget are
    /// not cached.
    pub fn insert(&self, key: WindowKey, values: Arc<Values>) {
        let size = approx_size(&values);
        if size > self.max_size {
            return;
        }

        let mut entries = self.entries.write();
        if entries.windows.contains_key(&key) {
            return;
        }

        // Size only changes under the write lock
        let mut current = self.current_size.load(Ordering::Relaxed);
        while current + size > self.max_size {
            let Some(oldest) = entries.order.pop_front() else { break };
            if let Some(w) = entries.windows.remove(&oldest) {
                current -= w.size;
            }
        }

        entries.order.push_back(key.clone());
        entries.windows.insert(key, CachedWindow { values, size });
        self.current_size.store(current + size, Ordering::Relaxed);
    }

    /// Clear the entire cache.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.windows.clear();
        entries.order.clear();
        self.current_size.store(0, Ordering::Relaxed);
    }

    /// Get the number of cached windows.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().windows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get current cache size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.current_size.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for WindowCache {
    fn default() -> Self {
        Self::default_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: usize) -> WindowKey {
        WindowKey {
            uri: "f.bin".into(),
            path: "/d".into(),
            start: DimVec::from_slice(&[n]),
            count: DimVec::from_slice(&[1]),
        }
    }

    #[test]
    fn test_cache_insert_get() {
        let cache = WindowCache::new(1024);
        let values = Arc::new(Values::Integer(vec![1, 2, 3]));
        cache.insert(key(0), values.clone());
        assert_eq!(cache.get(&key(0)).as_deref(), Some(&*values));
        assert!(cache.get(&key(1)).is_none());
        assert_eq!(cache.size(), 24);
    }

    #[test]
    fn test_cache_clear() {
        let cache = WindowCache::new(1024);
        cache.insert(key(0), Arc::new(Values::Boolean(vec![true])));
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_cache_eviction() {
        // 80 bytes holds ten 8-byte windows at most
        let cache = WindowCache::new(80);
        for i in 0..20 {
            cache.insert(key(i), Arc::new(Values::Float(vec![0.0])));
        }
        assert!(cache.len() <= 10);
        assert!(cache.size() <= 80);
    }

    #[test]
    fn test_cache_budget_with_mixed_sizes() {
        // Small windows first, then one that needs most of the budget
        let cache = WindowCache::new(64);
        for i in 0..4 {
            cache.insert(key(i), Arc::new(Values::Integer(vec![0])));
        }
        assert_eq!(cache.size(), 32);
        cache.insert(key(9), Arc::new(Values::Integer(vec![0; 7])));
        assert!(cache.size() <= 64);
        assert_eq!(cache.size(), 56 + 8);
        assert!(cache.get(&key(9)).is_some());
        // Oldest windows went first
        assert!(cache.get(&key(0)).is_none());
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.get(&key(2)).is_none());
        assert!(cache.get(&key(3)).is_some());
    }

    #[test]
    fn test_cache_skip_large() {
        let cache = WindowCache::new(16);
        cache.insert(key(0), Arc::new(Values::Integer(vec![0; 10])));
        assert!(cache.get(&key(0)).is_none());
    }
}
