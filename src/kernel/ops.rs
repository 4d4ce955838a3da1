//! Dense vector primitives shared by the kernel implementations
//!
//! Single-pair and block routines use the same summation order, so a block
//! entry is bit-identical to the corresponding single evaluation.

use crate::core::{KernelError, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Inner product <x, y>
pub fn dot(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
    assert_eq!(x.len(), y.len(), "Points must have the same dimension");
    x.iter().zip(y.iter()).map(|(&a, &b)| a * b).sum()
}

/// Squared Euclidean distance ||x - y||²
pub fn squared_distance(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
    assert_eq!(x.len(), y.len(), "Points must have the same dimension");
    x.iter()
        .zip(y.iter())
        .map(|(&a, &b)| {
            let diff = a - b;
            diff * diff
        })
        .sum()
}

/// Block of inner products between the rows of `a` and the rows of `b`
pub fn inner_product_block(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> Array2<f64> {
    assert_batches_compatible(a, b);
    Array2::from_shape_fn((a.nrows(), b.nrows()), |(i, j)| dot(a.row(i), b.row(j)))
}

/// Block of squared distances between the rows of `a` and the rows of `b`
pub fn squared_distance_block(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> Array2<f64> {
    assert_batches_compatible(a, b);
    Array2::from_shape_fn((a.nrows(), b.nrows()), |(i, j)| {
        squared_distance(a.row(i), b.row(j))
    })
}

/// Check that a weight block matches the block spanned by two batches
pub fn check_weights(
    a: ArrayView2<'_, f64>,
    b: ArrayView2<'_, f64>,
    weights: ArrayView2<'_, f64>,
) -> Result<()> {
    if weights.nrows() != a.nrows() {
        return Err(KernelError::DimensionMismatch {
            expected: a.nrows(),
            actual: weights.nrows(),
        });
    }
    if weights.ncols() != b.nrows() {
        return Err(KernelError::DimensionMismatch {
            expected: b.nrows(),
            actual: weights.ncols(),
        });
    }
    Ok(())
}

fn assert_batches_compatible(a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) {
    assert_eq!(
        a.ncols(),
        b.ncols(),
        "Batches must have the same point dimension"
    );
}
