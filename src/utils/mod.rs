//! Utility functions for kernel matrix computations

/// Brute-force reference evaluation, one pair of points at a time
///
/// These routines ignore the dataset's batching entirely: every pair is
/// evaluated as a pair of 1×d batches with a fresh state and a 1×1 weight
/// block. They are slow but serve as ground truth for the batched helpers.
pub mod reference {
    use crate::core::{check_regularization, Dataset, KernelError, Result};
    use crate::kernel::Kernel;
    use ndarray::{Array1, Array2, Axis};

    /// Regularized kernel matrix evaluated entry by entry
    pub fn kernel_matrix<K, D>(kernel: &K, data: &D, regularization: f64) -> Result<Array2<f64>>
    where
        K: Kernel + ?Sized,
        D: Dataset + ?Sized,
    {
        check_regularization(regularization)?;
        let n = data.len();
        Ok(Array2::from_shape_fn((n, n), |(i, j)| {
            let value = kernel.eval(data.point(i), data.point(j));
            if i == j {
                value + regularization
            } else {
                value
            }
        }))
    }

    /// Weighted parameter derivative accumulated one pair at a time
    pub fn parameter_derivative<K, D>(
        kernel: &K,
        data: &D,
        weights: &Array2<f64>,
    ) -> Result<Array1<f64>>
    where
        K: Kernel + ?Sized,
        D: Dataset + ?Sized,
    {
        let n = data.len();
        if weights.dim() != (n, n) {
            let (rows, cols) = weights.dim();
            return Err(KernelError::DimensionMismatch {
                expected: n,
                actual: if rows != n { rows } else { cols },
            });
        }

        let mut state = kernel.create_state();
        let mut result = Array1::zeros(kernel.number_of_parameters());
        let mut pair_weight = Array2::zeros((1, 1));
        for i in 0..n {
            let x1 = data.point(i).insert_axis(Axis(0));
            for j in 0..n {
                let x2 = data.point(j).insert_axis(Axis(0));
                pair_weight[[0, 0]] = weights[[i, j]];
                kernel.eval_batch_with_state(x1, x2, &mut state);
                let gradient =
                    kernel.weighted_parameter_derivative(x1, x2, pair_weight.view(), &state)?;
                result += &gradient;
            }
        }
        Ok(result)
    }
}

/// Dense matrix comparisons
pub mod matrix {
    use ndarray::{Array2, ArrayBase, Data, Ix1};

    /// Check whether a square matrix is symmetric within an absolute tolerance
    pub fn is_symmetric(matrix: &Array2<f64>, tolerance: f64) -> bool {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return false;
        }
        (0..rows).all(|i| (0..i).all(|j| (matrix[[i, j]] - matrix[[j, i]]).abs() <= tolerance))
    }

    /// Largest absolute entry-wise difference, infinite on a shape mismatch
    pub fn max_abs_difference(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
        if a.dim() != b.dim() {
            return f64::INFINITY;
        }
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    /// Largest relative entry-wise difference |a - b| / max(|a|, |b|)
    ///
    /// Pairs that are both exactly zero count as equal.
    pub fn max_relative_difference<S1, S2>(a: &ArrayBase<S1, Ix1>, b: &ArrayBase<S2, Ix1>) -> f64
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
    {
        if a.len() != b.len() {
            return f64::INFINITY;
        }
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| {
                let scale = x.abs().max(y.abs());
                if scale == 0.0 {
                    0.0
                } else {
                    (x - y).abs() / scale
                }
            })
            .fold(0.0, f64::max)
    }
}

/// Memory management utilities
pub mod memory {
    /// Bytes needed to store a dense n×n kernel matrix of f64 values
    pub fn estimate_kernel_matrix_memory(n_points: usize) -> usize {
        n_points * n_points * std::mem::size_of::<f64>()
    }

    /// Recommend a row cache size based on available memory and dataset size
    pub fn recommend_cache_size(n_points: usize, available_memory_mb: usize) -> usize {
        let available_bytes = available_memory_mb * 1024 * 1024;
        let full_matrix = estimate_kernel_matrix_memory(n_points);

        // Use at most 50% of available memory for cache
        full_matrix.min(available_bytes / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dataset, KernelError};
    use crate::data::BatchedDataset;
    use crate::kernel::{Kernel, PolynomialKernel, RbfKernel};
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn small_dataset() -> BatchedDataset {
        BatchedDataset::from_points(
            vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5]],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_reference_kernel_matrix() {
        let kernel = RbfKernel::new(1.0);
        let data = small_dataset();
        let matrix = reference::kernel_matrix(&kernel, &data, 0.5).unwrap();

        assert_eq!(matrix[[0, 0]], 1.5);
        assert_relative_eq!(matrix[[0, 1]], (-2.0_f64).exp(), epsilon = 1e-15);
        assert_relative_eq!(matrix[[1, 2]], (-0.5_f64).exp(), epsilon = 1e-15);
        assert!(matrix::is_symmetric(&matrix, 0.0));
    }

    #[test]
    fn test_reference_parameter_derivative() {
        let kernel = PolynomialKernel::new(2, 1.0, 1.0);
        let data = small_dataset();
        let weights = Array2::ones((3, 3));
        let gradient = reference::parameter_derivative(&kernel, &data, &weights).unwrap();

        // dK/dr = 2 (<x,y> + 1), summed over all pairs
        let mut expected_coef0 = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                let p = crate::kernel::ops::dot(data.point(i), data.point(j));
                expected_coef0 += 2.0 * (p + 1.0);
            }
        }
        assert_eq!(gradient.len(), kernel.number_of_parameters());
        assert_relative_eq!(gradient[1], expected_coef0, epsilon = 1e-12);
    }

    #[test]
    fn test_reference_parameter_derivative_shape_check() {
        let data = small_dataset();
        let result =
            reference::parameter_derivative(&RbfKernel::default(), &data, &Array2::ones((3, 2)));
        assert!(matches!(
            result,
            Err(KernelError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_is_symmetric() {
        assert!(matrix::is_symmetric(&array![[1.0, 2.0], [2.0, 1.0]], 0.0));
        assert!(!matrix::is_symmetric(&array![[1.0, 2.0], [2.1, 1.0]], 0.05));
        assert!(matrix::is_symmetric(&array![[1.0, 2.0], [2.1, 1.0]], 0.2));
        assert!(!matrix::is_symmetric(&Array2::zeros((2, 3)), 1.0));
    }

    #[test]
    fn test_differences() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.0, 2.5], [3.0, 3.0]];
        assert_eq!(matrix::max_abs_difference(&a, &b), 1.0);
        assert!(matrix::max_abs_difference(&a, &Array2::zeros((1, 1))).is_infinite());

        let x = array![2.0, 0.0, -4.0];
        let y = array![1.0, 0.0, -4.0];
        assert_eq!(matrix::max_relative_difference(&x, &y), 0.5);
    }

    #[test]
    fn test_memory_estimates() {
        assert_eq!(memory::estimate_kernel_matrix_memory(100), 80_000);
        assert_eq!(memory::recommend_cache_size(100, 1), 80_000);
        assert_eq!(memory::recommend_cache_size(10_000, 1), 512 * 1024);
    }
}
