//! In-memory dataset of dense points partitioned into batches

use crate::core::{check_batch_size, Dataset, KernelError, Result};
use ndarray::{concatenate, Array2, ArrayView1, ArrayView2, Axis};

/// Dense points stored as a sequence of row-major batch matrices
///
/// Every batch holds `batch_size` points except possibly the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchedDataset {
    batches: Vec<Array2<f64>>,
    len: usize,
    dim: usize,
    batch_size: usize,
}

impl BatchedDataset {
    /// Build a dataset from a matrix with one point per row
    pub fn from_array(points: Array2<f64>, batch_size: usize) -> Result<Self> {
        check_batch_size(batch_size)?;
        let (len, dim) = points.dim();

        let batches = if len == 0 {
            Vec::new()
        } else {
            points
                .axis_chunks_iter(Axis(0), batch_size)
                .map(|chunk| chunk.to_owned())
                .collect()
        };

        Ok(Self {
            batches,
            len,
            dim,
            batch_size,
        })
    }

    /// Build a dataset from individual points
    ///
    /// All points must have the same dimension. An empty list gives an empty
    /// dataset of dimension 0.
    pub fn from_points(points: Vec<Vec<f64>>, batch_size: usize) -> Result<Self> {
        check_batch_size(batch_size)?;
        let dim = points.first().map(Vec::len).unwrap_or(0);
        let len = points.len();

        let mut flat = Vec::with_capacity(len * dim);
        for point in points {
            if point.len() != dim {
                return Err(KernelError::DimensionMismatch {
                    expected: dim,
                    actual: point.len(),
                });
            }
            flat.extend(point);
        }

        let matrix = Array2::from_shape_vec((len, dim), flat)
            .map_err(|e| KernelError::InvalidDataset(e.to_string()))?;
        Self::from_array(matrix, batch_size)
    }

    /// Number of points per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Same points, partitioned with a different batch size
    pub fn rebatch(&self, batch_size: usize) -> Result<Self> {
        Self::from_array(self.to_array(), batch_size)
    }

    /// All points as a single matrix, one point per row
    pub fn to_array(&self) -> Array2<f64> {
        if self.batches.is_empty() {
            return Array2::zeros((0, self.dim));
        }
        let views: Vec<ArrayView2<'_, f64>> = self.batches.iter().map(|b| b.view()).collect();
        // Batches share the column count, so concatenation cannot fail
        concatenate(Axis(0), &views).unwrap_or_else(|_| Array2::zeros((0, self.dim)))
    }
}

impl Dataset for BatchedDataset {
    fn len(&self) -> usize {
        self.len
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn number_of_batches(&self) -> usize {
        self.batches.len()
    }

    fn batch(&self, b: usize) -> ArrayView2<'_, f64> {
        self.batches[b].view()
    }

    fn batch_offset(&self, b: usize) -> usize {
        assert!(b < self.batches.len(), "Batch index out of range");
        b * self.batch_size
    }

    fn point(&self, i: usize) -> ArrayView1<'_, f64> {
        assert!(i < self.len, "Point index {} out of range for {} points", i, self.len);
        self.batches[i / self.batch_size].row(i % self.batch_size)
    }
}
