//! High-level API for kernel matrix computations
//!
//! This module provides a builder-style interface over the free helper
//! functions, carrying the kernel and a [`HelperConfig`] together.
//!
//! # Quick Start
//!
//! ```rust
//! use rkernel::api::KernelHelper;
//! use rkernel::kernel::RbfKernel;
//! use ndarray::Array2;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let helper = KernelHelper::with_kernel(RbfKernel::new(0.5))
//!     .with_regularization(1.0)
//!     .with_batch_size(8);
//!
//! let data = helper.dataset(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5]])?;
//! let matrix = helper.kernel_matrix(&data)?;
//! assert_eq!(matrix.dim(), (3, 3));
//!
//! let gradient = helper.parameter_derivative(&data, &Array2::ones((3, 3)))?;
//! assert_eq!(gradient.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::core::{Dataset, HelperConfig, Result};
use crate::data::{self, BatchedDataset};
use crate::helpers::{self, CachedKernelMatrix};
use crate::kernel::{Kernel, RbfKernel};
use log::info;
use ndarray::{Array1, Array2};
use std::path::Path;

/// Kernel helper interface with builder pattern
#[derive(Debug, Clone)]
pub struct KernelHelper<K: Kernel = RbfKernel> {
    kernel: K,
    config: HelperConfig,
}

impl KernelHelper<RbfKernel> {
    /// Create a helper with a unit-gamma RBF kernel and default configuration
    pub fn new() -> Self {
        Self {
            kernel: RbfKernel::default(),
            config: HelperConfig::default(),
        }
    }
}

impl Default for KernelHelper<RbfKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> KernelHelper<K> {
    /// Create a helper with a custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            config: HelperConfig::default(),
        }
    }

    /// Set the value added to the kernel matrix diagonal
    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.config.regularization = regularization;
        self
    }

    /// Set the number of points per batch for datasets built by this helper
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Set the row cache size in bytes for lazily evaluated matrices
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.config.cache_size = cache_size;
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: HelperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Mutable access to the kernel, e.g. to update its parameters
    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    /// Build a dataset from points using the configured batch size
    pub fn dataset(&self, points: Vec<Vec<f64>>) -> Result<BatchedDataset> {
        BatchedDataset::from_points(points, self.config.batch_size)
    }

    /// Load a dataset from a CSV file using the configured batch size
    pub fn dataset_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<BatchedDataset> {
        data::load_dataset(path, self.config.batch_size)
    }

    /// Regularized kernel matrix of a dataset
    pub fn kernel_matrix<D: Dataset + ?Sized>(&self, data: &D) -> Result<Array2<f64>> {
        self.config.validate()?;
        helpers::calculate_regularized_kernel_matrix(&self.kernel, data, self.config.regularization)
    }

    /// Kernel matrix between two datasets (no regularization)
    pub fn mixed_kernel_matrix<A, B>(&self, data_a: &A, data_b: &B) -> Result<Array2<f64>>
    where
        A: Dataset + ?Sized,
        B: Dataset + ?Sized,
    {
        helpers::calculate_mixed_kernel_matrix(&self.kernel, data_a, data_b)
    }

    /// Weighted parameter derivative Σᵢⱼ W[i][j] ∂k(xᵢ, xⱼ)/∂θ
    pub fn parameter_derivative<D: Dataset + ?Sized>(
        &self,
        data: &D,
        weights: &Array2<f64>,
    ) -> Result<Array1<f64>> {
        helpers::calculate_kernel_matrix_parameter_derivative(&self.kernel, data, weights)
    }

    /// Lazily evaluated regularized kernel matrix with a row cache
    pub fn cached_matrix<'a, D: Dataset + ?Sized>(
        &'a self,
        data: &'a D,
    ) -> Result<CachedKernelMatrix<'a, K, D>> {
        self.config.validate()?;
        info!(
            "Creating cached {} kernel matrix for {} points ({} bytes of row cache)",
            self.kernel.name(),
            data.len(),
            self.config.cache_size
        );
        CachedKernelMatrix::new(
            &self.kernel,
            data,
            self.config.regularization,
            self.config.cache_size,
        )
    }
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Regularized RBF kernel matrix of the points in a CSV file
    pub fn rbf_matrix_from_csv<P: AsRef<Path>>(
        path: P,
        gamma: f64,
        regularization: f64,
    ) -> Result<Array2<f64>> {
        let helper = KernelHelper::with_kernel(RbfKernel::new(gamma))
            .with_regularization(regularization);
        let data = helper.dataset_from_csv(path)?;
        helper.kernel_matrix(&data)
    }

    /// RBF parameter derivative for points and weights stored in CSV files
    pub fn rbf_derivative_from_csv<P1: AsRef<Path>, P2: AsRef<Path>>(
        points_path: P1,
        weights_path: P2,
        gamma: f64,
    ) -> Result<Array1<f64>> {
        let helper = KernelHelper::with_kernel(RbfKernel::new(gamma));
        let data = helper.dataset_from_csv(points_path)?;
        let weights = data::read_matrix_file(weights_path)?;
        helper.parameter_derivative(&data, &weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KernelError;
    use crate::kernel::{LinearKernel, PolynomialKernel};
    use ndarray::{array, ArrayView1, ArrayView2};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builder_pattern() {
        let helper = KernelHelper::new()
            .with_regularization(2.0)
            .with_batch_size(16)
            .with_cache_size(1024);

        assert_eq!(helper.config().regularization, 2.0);
        assert_eq!(helper.config().batch_size, 16);
        assert_eq!(helper.config().cache_size, 1024);
        assert_eq!(helper.kernel().gamma(), 1.0);
    }

    #[test]
    fn test_kernel_matrix_with_regularization() {
        let helper = KernelHelper::with_kernel(LinearKernel::new()).with_regularization(1.0);
        let data = helper.dataset(vec![vec![1.0, 0.0], vec![0.0, 2.0]]).unwrap();
        let matrix = helper.kernel_matrix(&data).unwrap();
        assert_eq!(matrix, array![[2.0, 0.0], [0.0, 5.0]]);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let helper = KernelHelper::new().with_regularization(-1.0);
        let data = helper.dataset(vec![vec![1.0]]).unwrap();
        assert!(matches!(
            helper.kernel_matrix(&data),
            Err(KernelError::InvalidParameter(_))
        ));

        let helper = KernelHelper::new().with_batch_size(0);
        assert!(helper.dataset(vec![vec![1.0]]).is_err());
    }

    #[test]
    fn test_kernel_mut_updates_parameters() {
        let mut helper = KernelHelper::with_kernel(PolynomialKernel::quadratic(1.0));
        helper.kernel_mut().set_parameter_vector(&[2.0, 0.0]).unwrap();

        let data = helper.dataset(vec![vec![1.0, 1.0]]).unwrap();
        // (2 * 2 + 0)² = 16
        assert_eq!(helper.kernel_matrix(&data).unwrap()[[0, 0]], 16.0);
    }

    #[test]
    fn test_cached_matrix_through_helper() {
        let helper = KernelHelper::new().with_regularization(0.5);
        let data = helper
            .dataset(vec![vec![0.0], vec![1.0], vec![2.0]])
            .unwrap();
        let dense = helper.kernel_matrix(&data).unwrap();
        let mut cached = helper.cached_matrix(&data).unwrap();

        assert_eq!(cached.to_dense(), dense);
    }

    #[test]
    fn test_quick_functions() {
        let mut points = NamedTempFile::with_suffix(".csv").expect("Failed to create temp file");
        writeln!(points, "x,y").expect("Failed to write");
        writeln!(points, "0.0,0.0").expect("Failed to write");
        writeln!(points, "1.0,0.0").expect("Failed to write");
        points.flush().expect("Failed to flush");

        let mut weights = NamedTempFile::with_suffix(".csv").expect("Failed to create temp file");
        writeln!(weights, "1,2").expect("Failed to write");
        writeln!(weights, "2,1").expect("Failed to write");
        weights.flush().expect("Failed to flush");

        let matrix = quick::rbf_matrix_from_csv(points.path(), 1.0, 1.0).unwrap();
        assert_eq!(matrix[[0, 0]], 2.0);
        assert!((matrix[[0, 1]] - (-1.0_f64).exp()).abs() < 1e-15);

        // Only the off-diagonal pairs contribute: 2 * 2 * (-1 * e^-1)
        let gradient = quick::rbf_derivative_from_csv(points.path(), weights.path(), 1.0).unwrap();
        assert!((gradient[0] + 4.0 * (-1.0_f64).exp()).abs() < 1e-14);
    }

    #[test]
    fn test_custom_dataset_implementation() {
        // Dataset that keeps every point in a single batch
        struct SingleBatch {
            points: Array2<f64>,
        }

        impl Dataset for SingleBatch {
            fn len(&self) -> usize {
                self.points.nrows()
            }
            fn dim(&self) -> usize {
                self.points.ncols()
            }
            fn number_of_batches(&self) -> usize {
                1
            }
            fn batch(&self, _b: usize) -> ArrayView2<'_, f64> {
                self.points.view()
            }
            fn batch_offset(&self, _b: usize) -> usize {
                0
            }
            fn point(&self, i: usize) -> ArrayView1<'_, f64> {
                self.points.row(i)
            }
        }

        let points = array![[0.1, 0.2], [0.3, -0.4], [-0.5, 0.6]];
        let custom = SingleBatch {
            points: points.clone(),
        };
        let helper = KernelHelper::new().with_batch_size(1);
        let batched = BatchedDataset::from_array(points, 1).unwrap();

        assert_eq!(
            helper.kernel_matrix(&custom).unwrap(),
            helper.kernel_matrix(&batched).unwrap()
        );
    }
}
