//! Kernel trait definition

use crate::core::Result;
use crate::kernel::KernelState;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Kernel function trait
///
/// A kernel k(x, y) is a similarity function over pairs of points, possibly
/// parameterized by a vector θ of real hyperparameters. Besides plain
/// evaluation it supports batched evaluation that records intermediate values
/// in a caller-owned [`KernelState`], which the parameter derivative then
/// reads back.
///
/// Batches are matrices with one point per row. A block evaluated from
/// batches `a` (n rows) and `b` (m rows) is an n×m matrix.
///
/// The trait is object safe; helpers accept `&dyn Kernel` as well as concrete
/// kernels.
pub trait Kernel: Send + Sync {
    /// Short identifier of the kernel family
    fn name(&self) -> &'static str;

    /// Number of entries in the parameter vector
    fn number_of_parameters(&self) -> usize;

    /// Current parameter vector θ
    fn parameter_vector(&self) -> Vec<f64>;

    /// Replace the parameter vector θ
    ///
    /// Fails with `DimensionMismatch` on a wrong length and with
    /// `InvalidParameter` on values outside the kernel's domain.
    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()>;

    /// Compute kernel value k(x, y)
    fn eval(&self, x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64;

    /// Create an empty evaluation state for this kernel
    fn create_state(&self) -> KernelState {
        KernelState::new()
    }

    /// Compute the block of kernel values between two batches
    fn eval_batch(&self, a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> Array2<f64> {
        let mut state = self.create_state();
        self.eval_batch_with_state(a, b, &mut state)
    }

    /// Compute the block of kernel values and keep what the derivative needs
    fn eval_batch_with_state(
        &self,
        a: ArrayView2<'_, f64>,
        b: ArrayView2<'_, f64>,
        state: &mut KernelState,
    ) -> Array2<f64>;

    /// Weighted parameter derivative of a block
    ///
    /// Returns Σᵢⱼ weights[i][j] · ∂k(aᵢ, bⱼ)/∂θ. `state` must come from
    /// `eval_batch_with_state` on the same two batches.
    fn weighted_parameter_derivative(
        &self,
        a: ArrayView2<'_, f64>,
        b: ArrayView2<'_, f64>,
        weights: ArrayView2<'_, f64>,
        state: &KernelState,
    ) -> Result<Array1<f64>>;
}

impl Kernel for Box<dyn Kernel> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn number_of_parameters(&self) -> usize {
        (**self).number_of_parameters()
    }

    fn parameter_vector(&self) -> Vec<f64> {
        (**self).parameter_vector()
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        (**self).set_parameter_vector(parameters)
    }

    fn eval(&self, x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
        (**self).eval(x, y)
    }

    fn create_state(&self) -> KernelState {
        (**self).create_state()
    }

    fn eval_batch(&self, a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>) -> Array2<f64> {
        (**self).eval_batch(a, b)
    }

    fn eval_batch_with_state(
        &self,
        a: ArrayView2<'_, f64>,
        b: ArrayView2<'_, f64>,
        state: &mut KernelState,
    ) -> Array2<f64> {
        (**self).eval_batch_with_state(a, b, state)
    }

    fn weighted_parameter_derivative(
        &self,
        a: ArrayView2<'_, f64>,
        b: ArrayView2<'_, f64>,
        weights: ArrayView2<'_, f64>,
        state: &KernelState,
    ) -> Result<Array1<f64>> {
        (**self).weighted_parameter_derivative(a, b, weights, state)
    }
}
