//! Core traits for kernel helper routines

use ndarray::{ArrayView1, ArrayView2};

/// Dataset abstraction: an ordered collection of dense points, stored in batches
///
/// Points are rows of the batch matrices. Batching only controls how the
/// helpers chunk their work; it never changes what they compute.
pub trait Dataset {
    /// Number of points in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality of every point)
    fn dim(&self) -> usize;

    /// Number of batches the points are partitioned into
    fn number_of_batches(&self) -> usize;

    /// Get batch `b` as a matrix with one point per row
    ///
    /// # Panics
    /// Panics if b >= number_of_batches()
    fn batch(&self, b: usize) -> ArrayView2<'_, f64>;

    /// Index of the first point of batch `b`
    ///
    /// # Panics
    /// Panics if b >= number_of_batches()
    fn batch_offset(&self, b: usize) -> usize;

    /// Get a single point by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn point(&self, i: usize) -> ArrayView1<'_, f64>;

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
