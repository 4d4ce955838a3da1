//! Kernel matrix helpers
//!
//! Dense kernel (Gram) matrices and weighted parameter derivatives over a
//! batched dataset. All routines walk the data batch by batch; the batch size
//! changes only the chunking, never the result beyond floating-point rounding.

pub mod cached;

pub use self::cached::CachedKernelMatrix;

use crate::core::{check_regularization, Dataset, KernelError, Result};
use crate::kernel::Kernel;
use log::debug;
use ndarray::{s, Array1, Array2};

/// Compute the kernel matrix K[i][j] = k(xᵢ, xⱼ)
pub fn calculate_kernel_matrix<K, D>(kernel: &K, data: &D) -> Result<Array2<f64>>
where
    K: Kernel + ?Sized,
    D: Dataset + ?Sized,
{
    calculate_regularized_kernel_matrix(kernel, data, 0.0)
}

/// Compute the regularized kernel matrix K[i][j] = k(xᵢ, xⱼ) + λ·[i == j]
///
/// Blocks below the block diagonal are mirrored from the ones above it, so
/// the result is exactly symmetric for symmetric kernels. An empty dataset
/// yields a 0×0 matrix.
///
/// # Errors
/// `InvalidParameter` if `regularization` is negative or not finite.
pub fn calculate_regularized_kernel_matrix<K, D>(
    kernel: &K,
    data: &D,
    regularization: f64,
) -> Result<Array2<f64>>
where
    K: Kernel + ?Sized,
    D: Dataset + ?Sized,
{
    check_regularization(regularization)?;

    let n = data.len();
    let batches = data.number_of_batches();
    debug!(
        "Computing {}x{} {} kernel matrix over {} batches (regularization {})",
        n,
        n,
        kernel.name(),
        batches,
        regularization
    );

    let mut matrix = Array2::zeros((n, n));
    for i in 0..batches {
        let batch_i = data.batch(i);
        let start_i = data.batch_offset(i);
        let end_i = start_i + batch_i.nrows();

        for j in 0..=i {
            let batch_j = data.batch(j);
            let start_j = data.batch_offset(j);
            let end_j = start_j + batch_j.nrows();

            let block = kernel.eval_batch(batch_j, batch_i);
            matrix
                .slice_mut(s![start_j..end_j, start_i..end_i])
                .assign(&block);
            if i != j {
                matrix
                    .slice_mut(s![start_i..end_i, start_j..end_j])
                    .assign(&block.t());
            }
        }
    }

    for k in 0..n {
        matrix[[k, k]] += regularization;
    }

    Ok(matrix)
}

/// Compute the kernel matrix between two datasets, K[i][j] = k(aᵢ, bⱼ)
///
/// # Errors
/// `DimensionMismatch` if the points of the two datasets differ in dimension
/// (unless one of them is empty).
pub fn calculate_mixed_kernel_matrix<K, A, B>(
    kernel: &K,
    data_a: &A,
    data_b: &B,
) -> Result<Array2<f64>>
where
    K: Kernel + ?Sized,
    A: Dataset + ?Sized,
    B: Dataset + ?Sized,
{
    let (rows, cols) = (data_a.len(), data_b.len());
    if rows > 0 && cols > 0 && data_a.dim() != data_b.dim() {
        return Err(KernelError::DimensionMismatch {
            expected: data_a.dim(),
            actual: data_b.dim(),
        });
    }
    debug!(
        "Computing {}x{} mixed {} kernel matrix",
        rows,
        cols,
        kernel.name()
    );

    let mut matrix = Array2::zeros((rows, cols));
    for i in 0..data_a.number_of_batches() {
        let batch_a = data_a.batch(i);
        let start_a = data_a.batch_offset(i);
        let end_a = start_a + batch_a.nrows();

        for j in 0..data_b.number_of_batches() {
            let batch_b = data_b.batch(j);
            let start_b = data_b.batch_offset(j);
            let end_b = start_b + batch_b.nrows();

            matrix
                .slice_mut(s![start_a..end_a, start_b..end_b])
                .assign(&kernel.eval_batch(batch_a, batch_b));
        }
    }

    Ok(matrix)
}

/// Compute Σᵢ Σⱼ W[i][j] · ∂k(xᵢ, xⱼ)/∂θ
///
/// Every ordered pair of batches is evaluated into a fresh state and
/// differentiated against the matching block of `weights`. Each pair's
/// derivative is scaled by its own weight before it is summed, so the weight
/// matrix need not be symmetric.
///
/// The result has `kernel.number_of_parameters()` entries.
///
/// # Errors
/// `DimensionMismatch` if `weights` is not N×N for a dataset of N points.
pub fn calculate_kernel_matrix_parameter_derivative<K, D>(
    kernel: &K,
    data: &D,
    weights: &Array2<f64>,
) -> Result<Array1<f64>>
where
    K: Kernel + ?Sized,
    D: Dataset + ?Sized,
{
    let n = data.len();
    let (rows, cols) = weights.dim();
    if rows != n {
        return Err(KernelError::DimensionMismatch {
            expected: n,
            actual: rows,
        });
    }
    if cols != n {
        return Err(KernelError::DimensionMismatch {
            expected: n,
            actual: cols,
        });
    }

    let batches = data.number_of_batches();
    debug!(
        "Computing weighted {} parameter derivative over {} points in {} batches",
        kernel.name(),
        n,
        batches
    );

    let mut gradient = Array1::zeros(kernel.number_of_parameters());
    let mut state = kernel.create_state();
    for i in 0..batches {
        let batch_i = data.batch(i);
        let start_i = data.batch_offset(i);
        let end_i = start_i + batch_i.nrows();

        for j in 0..batches {
            let batch_j = data.batch(j);
            let start_j = data.batch_offset(j);
            let end_j = start_j + batch_j.nrows();

            kernel.eval_batch_with_state(batch_i, batch_j, &mut state);
            let block_weights = weights.slice(s![start_i..end_i, start_j..end_j]);
            let block_gradient =
                kernel.weighted_parameter_derivative(batch_i, batch_j, block_weights, &state)?;
            gradient += &block_gradient;
        }
    }

    Ok(gradient)
}
