//! Kernel row cache
//!
//! LRU cache for rows of a kernel matrix, so that repeated row requests on a
//! lazily evaluated matrix avoid redundant kernel evaluations.

use lru::LruCache;
use ndarray::Array1;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// LRU cache of kernel matrix rows keyed by row index
pub struct RowCache {
    cache: LruCache<usize, Arc<Array1<f64>>>,
    hits: u64,
    misses: u64,
}

impl RowCache {
    /// Create a new row cache holding at most `capacity` rows
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a row cache sized for rows of `row_length` entries within a byte budget
    pub fn with_memory_limit(memory_bytes: usize, row_length: usize) -> Self {
        let row_bytes = row_length.max(1) * std::mem::size_of::<f64>();
        Self::new(memory_bytes / row_bytes)
    }

    /// Get a row from the cache
    pub fn get(&mut self, row: usize) -> Option<Arc<Array1<f64>>> {
        if let Some(values) = self.cache.get(&row) {
            self.hits += 1;
            Some(Arc::clone(values))
        } else {
            self.misses += 1;
            None
        }
    }

    /// Put a row into the cache
    pub fn put(&mut self, row: usize, values: Arc<Array1<f64>>) {
        self.cache.put(row, values);
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.cache.cap().get(),
            size: self.cache.len(),
        }
    }

}

/// Cache statistics
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_row_cache_basic() {
        let mut cache = RowCache::new(3);

        assert!(cache.get(0).is_none());
        assert_eq!(cache.stats().misses, 1);

        cache.put(0, Arc::new(array![1.0, 2.0]));
        assert_eq!(*cache.get(0).unwrap(), array![1.0, 2.0]);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_row_cache_lru_eviction() {
        let mut cache = RowCache::new(2);

        cache.put(0, Arc::new(array![0.0]));
        cache.put(1, Arc::new(array![1.0]));
        cache.put(2, Arc::new(array![2.0])); // Should evict row 0

        assert!(cache.get(0).is_none());
        assert!(cache.get(1).is_some());
        assert!(cache.get(2).is_some());
        assert_eq!(cache.stats().size, 2);
    }

    #[test]
    fn test_hit_rate_calculation() {
        let mut cache = RowCache::new(10);
        assert_eq!(cache.stats().hit_rate(), 0.0);

        cache.get(0);
        cache.get(1);
        cache.put(0, Arc::new(array![1.0]));
        cache.get(0);
        cache.get(0);

        // 2 hits, 2 misses
        assert_eq!(cache.stats().hit_rate(), 0.5);
    }

    #[test]
    fn test_cache_with_memory_limit() {
        // 100 rows of 10 f64 values fit into 8000 bytes
        let cache = RowCache::with_memory_limit(8000, 10);
        assert_eq!(cache.stats().capacity, 100);

        // Never below one row
        let tiny = RowCache::with_memory_limit(1, 1000);
        assert_eq!(tiny.stats().capacity, 1);
    }
}
