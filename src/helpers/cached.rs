//! Lazily evaluated regularized kernel matrix with a row cache

use crate::cache::{CacheStats, RowCache};
use crate::core::{check_regularization, Dataset, Result};
use crate::kernel::Kernel;
use ndarray::{s, Array1, Array2, Axis};
use std::sync::Arc;

/// Regularized kernel matrix whose entries are computed on demand
///
/// Entries agree with
/// [`calculate_regularized_kernel_matrix`](super::calculate_regularized_kernel_matrix)
/// for the same kernel, data and regularization. Rows are kept in an LRU
/// cache so that repeated row access does not re-evaluate the kernel.
pub struct CachedKernelMatrix<'a, K: Kernel + ?Sized, D: Dataset + ?Sized> {
    kernel: &'a K,
    data: &'a D,
    regularization: f64,
    cache: RowCache,
}

impl<'a, K: Kernel + ?Sized, D: Dataset + ?Sized> CachedKernelMatrix<'a, K, D> {
    /// Create a lazily evaluated matrix with a row cache of `cache_size` bytes
    pub fn new(kernel: &'a K, data: &'a D, regularization: f64, cache_size: usize) -> Result<Self> {
        check_regularization(regularization)?;
        Ok(Self {
            kernel,
            data,
            regularization,
            cache: RowCache::with_memory_limit(cache_size, data.len()),
        })
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn regularization(&self) -> f64 {
        self.regularization
    }

    /// Single entry K[i][j], computed directly
    ///
    /// # Panics
    /// Panics if i or j is out of range
    pub fn entry(&self, i: usize, j: usize) -> f64 {
        let value = self.kernel.eval(self.data.point(i), self.data.point(j));
        if i == j {
            value + self.regularization
        } else {
            value
        }
    }

    /// Row K[i][..], served from the cache when possible
    ///
    /// # Panics
    /// Panics if i is out of range
    pub fn row(&mut self, i: usize) -> Arc<Array1<f64>> {
        if let Some(row) = self.cache.get(i) {
            return row;
        }
        let row = Arc::new(self.compute_row(i));
        self.cache.put(i, Arc::clone(&row));
        row
    }

    /// Diagonal entries K[i][i]
    pub fn diagonal(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.size(), |i| self.entry(i, i))
    }

    /// Materialize the full matrix row by row
    pub fn to_dense(&mut self) -> Array2<f64> {
        let n = self.size();
        let mut matrix = Array2::zeros((n, n));
        for i in 0..n {
            matrix.row_mut(i).assign(&*self.row(i));
        }
        matrix
    }

    /// Row cache statistics
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn compute_row(&self, i: usize) -> Array1<f64> {
        let point = self.data.point(i).insert_axis(Axis(0));
        let mut row = Array1::zeros(self.size());
        for b in 0..self.data.number_of_batches() {
            let batch = self.data.batch(b);
            let start = self.data.batch_offset(b);
            let block = self.kernel.eval_batch(point, batch);
            row.slice_mut(s![start..start + batch.nrows()])
                .assign(&block.row(0));
        }
        row[i] += self.regularization;
        row
    }
}
