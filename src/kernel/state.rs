//! Evaluation state shared between a batched evaluation and its derivative

use crate::core::{KernelError, Result};
use ndarray::{Array2, ArrayView2};

/// Intermediate values of the last evaluated block
///
/// The state is owned by the caller, filled by
/// [`Kernel::eval_batch_with_state`](crate::kernel::Kernel::eval_batch_with_state)
/// and read by
/// [`Kernel::weighted_parameter_derivative`](crate::kernel::Kernel::weighted_parameter_derivative).
/// It lives for one matrix or gradient computation and is then dropped.
#[derive(Debug, Clone, Default)]
pub struct KernelState {
    /// Kernel-specific per-pair quantity (squared distance, inner product, ...)
    intermediate: Array2<f64>,
    /// Kernel values of the block
    values: Array2<f64>,
}

impl KernelState {
    /// Create an empty state
    pub fn new() -> Self {
        Self {
            intermediate: Array2::zeros((0, 0)),
            values: Array2::zeros((0, 0)),
        }
    }

    /// Record the intermediate and value blocks of an evaluation
    ///
    /// # Panics
    /// Panics if the two blocks have different shapes
    pub fn store(&mut self, intermediate: Array2<f64>, values: Array2<f64>) {
        assert_eq!(
            intermediate.dim(),
            values.dim(),
            "Intermediate and value blocks must have the same shape"
        );
        self.intermediate = intermediate;
        self.values = values;
    }

    /// Kernel-specific per-pair intermediate block
    pub fn intermediate(&self) -> ArrayView2<'_, f64> {
        self.intermediate.view()
    }

    /// Kernel values of the stored block
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Shape (rows, cols) of the stored block
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Check that the state holds a block of the given shape
    pub fn check_shape(&self, rows: usize, cols: usize) -> Result<()> {
        let (state_rows, state_cols) = self.shape();
        if state_rows != rows {
            return Err(KernelError::DimensionMismatch {
                expected: rows,
                actual: state_rows,
            });
        }
        if state_cols != cols {
            return Err(KernelError::DimensionMismatch {
                expected: cols,
                actual: state_cols,
            });
        }
        Ok(())
    }
}
