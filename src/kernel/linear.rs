//! Linear kernel implementation

use crate::core::{KernelError, Result};
use crate::kernel::ops::{check_weights, dot, inner_product_block};
use crate::kernel::{Kernel, KernelState};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Linear kernel: K(x, y) = x^T * y
///
/// The simplest kernel. It has no parameters, so its parameter derivative is
/// the empty vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn number_of_parameters(&self) -> usize {
        0
    }

    fn parameter_vector(&self) -> Vec<f64> {
        Vec::new()
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        if !parameters.is_empty() {
            return Err(KernelError::DimensionMismatch {
                expected: 0,
                actual: parameters.len(),
            });
        }
        Ok(())
    }

    fn eval(&self, x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
        dot(x, y)
    }

    fn eval_batch_with_state(
        &self,
        a: ArrayView2<'_, f64>,
        b: ArrayView2<'_, f64>,
        state: &mut KernelState,
    ) -> Array2<f64> {
        let values = inner_product_block(a, b);
        state.store(values.clone(), values.clone());
        values
    }

    fn weighted_parameter_derivative(
        &self,
        a: ArrayView2<'_, f64>,
        b: ArrayView2<'_, f64>,
        weights: ArrayView2<'_, f64>,
        state: &KernelState,
    ) -> Result<Array1<f64>> {
        check_weights(a, b, weights)?;
        state.check_shape(a.nrows(), b.nrows())?;
        Ok(Array1::zeros(0))
    }
}
