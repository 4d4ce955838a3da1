//! Gaussian RBF (Radial Basis Function) kernel implementation
//!
//! The RBF kernel is defined as: K(x, y) = exp(-γ * ||x - y||²)
//! where γ (gamma) is a hyperparameter that controls the kernel width.

use crate::core::{KernelError, Result};
use crate::kernel::ops::{check_weights, squared_distance, squared_distance_block};
use crate::kernel::{Kernel, KernelState};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Gaussian RBF kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// The gamma parameter controls the "reach" of each point:
/// - High gamma: only close points are similar
/// - Low gamma: distant points still have influence
///
/// The kernel has a single parameter. In the default (constrained) encoding
/// the parameter vector is `[γ]`. In the unconstrained encoding it is
/// `[ln γ]`, which lets gradient-based tuners move freely over the real line
/// while γ stays positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RbfKernel {
    gamma: f64,
    unconstrained: bool,
}

impl RbfKernel {
    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Arguments
    /// * `gamma` - The gamma parameter (must be positive)
    ///
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self {
            gamma,
            unconstrained: false,
        }
    }

    /// Create RBF kernel with gamma = 1.0 / n_features
    ///
    /// # Panics
    /// Panics if n_features is zero
    pub fn with_auto_gamma(n_features: usize) -> Self {
        assert!(n_features > 0, "Number of features must be positive");
        Self::new(1.0 / n_features as f64)
    }

    /// Create RBF kernel with gamma = 1.0
    pub fn unit_gamma() -> Self {
        Self::new(1.0)
    }

    /// Switch between the `[γ]` and `[ln γ]` parameter encodings
    pub fn with_unconstrained(mut self, unconstrained: bool) -> Self {
        self.unconstrained = unconstrained;
        self
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Whether the parameter vector holds ln γ instead of γ
    pub fn is_unconstrained(&self) -> bool {
        self.unconstrained
    }
}

impl Default for RbfKernel {
    /// Default RBF kernel with gamma = 1.0
    fn default() -> Self {
        Self::unit_gamma()
    }
}

impl Kernel for RbfKernel {
    fn name(&self) -> &'static str {
        "rbf"
    }

    fn number_of_parameters(&self) -> usize {
        1
    }

    fn parameter_vector(&self) -> Vec<f64> {
        if self.unconstrained {
            vec![self.gamma.ln()]
        } else {
            vec![self.gamma]
        }
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        if parameters.len() != 1 {
            return Err(KernelError::DimensionMismatch {
                expected: 1,
                actual: parameters.len(),
            });
        }
        let gamma = if self.unconstrained {
            parameters[0].exp()
        } else {
            parameters[0]
        };
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(KernelError::InvalidParameter(format!(
                "gamma must be positive and finite, got {gamma}"
            )));
        }
        self.gamma = gamma;
        Ok(())
    }

    fn eval(&self, x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
        (-self.gamma * squared_distance(x, y)).exp()
    }

    fn eval_batch_with_state(
        &self,
        a: ArrayView2<'_, f64>,
        b: ArrayView2<'_, f64>,
        state: &mut KernelState,
    ) -> Array2<f64> {
        let distances = squared_distance_block(a, b);
        let values = distances.mapv(|d| (-self.gamma * d).exp());
        state.store(distances, values.clone());
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

        // dk/dγ = -||x - y||² k; the log encoding adds the chain factor γ
        let chain = if self.unconstrained { self.gamma } else { 1.0 };

        let mut derivative = 0.0;
        for ((&w, &d), &k) in weights
            .iter()
            .zip(state.intermediate().iter())
            .zip(state.values().iter())
        {
            derivative += w * (-chain * d * k);
        }

        Ok(Array1::from_elem(1, derivative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_rbf_kernel_creation() {
        let kernel = RbfKernel::new(0.5);
        assert_eq!(kernel.gamma(), 0.5);
        assert!(!kernel.is_unconstrained());

        let kernel_auto = RbfKernel::with_auto_gamma(10);
        assert_eq!(kernel_auto.gamma(), 0.1);

        let kernel_default = RbfKernel::default();
        assert_eq!(kernel_default.gamma(), 1.0);
        assert_eq!(kernel_default.number_of_parameters(), 1);
    }

    #[test]
    #[should_panic(expected = "Gamma must be positive")]
    fn test_rbf_kernel_invalid_gamma() {
        RbfKernel::new(-0.5);
    }

    #[test]
    #[should_panic(expected = "Gamma must be positive")]
    fn test_rbf_kernel_zero_gamma() {
        RbfKernel::new(0.0);
    }

    #[test]
    #[should_panic(expected = "Number of features must be positive")]
    fn test_rbf_kernel_zero_features() {
        RbfKernel::with_auto_gamma(0);
    }

    #[test]
    fn test_rbf_kernel_identical_vectors() {
        let kernel = RbfKernel::new(1.0);
        let x = array![1.0, 2.0, 3.0];
        assert_eq!(kernel.eval(x.view(), x.view()), 1.0);
    }

    #[test]
    fn test_rbf_kernel_different_gammas() {
        let x = array![1.0];
        let y = array![3.0];

        // ||x - y||² = 4
        let low = RbfKernel::new(0.1).eval(x.view(), y.view());
        let high = RbfKernel::new(10.0).eval(x.view(), y.view());

        assert!(low > high);
        assert_relative_eq!(low, (-0.4_f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(high, (-40.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_rbf_kernel_symmetry() {
        let kernel = RbfKernel::new(0.5);
        let x = array![1.0, 0.0, 2.0, 0.0, 3.0];
        let y = array![0.0, 1.0, 2.0, 3.0, 0.0];
        assert_eq!(kernel.eval(x.view(), y.view()), kernel.eval(y.view(), x.view()));
    }

    #[test]
    fn test_rbf_kernel_numerical_stability() {
        let kernel = RbfKernel::new(1e-6);
        let x = array![1e6];
        let y = array![-1e6];

        let result = kernel.eval(x.view(), y.view());
        assert!(result.is_finite());
        assert!((0.0..=1.0).contains(&result));
    }

    #[test]
    fn test_eval_batch_matches_eval() {
        let kernel = RbfKernel::new(0.7);
        let a = array![[0.1, -0.4], [0.9, 0.3], [-1.0, 0.5]];
        let b = array![[0.2, 0.2], [-0.6, 0.8]];

        let mut state = kernel.create_state();
        let block = kernel.eval_batch_with_state(a.view(), b.view(), &mut state);

        assert_eq!(block.dim(), (3, 2));
        assert_eq!(state.shape(), (3, 2));
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(block[[i, j]], kernel.eval(a.row(i), b.row(j)));
            }
        }
    }

    #[test]
    fn test_parameter_derivative_single_pair() {
        let kernel = RbfKernel::new(0.5);
        let a = array![[1.0, 0.0]];
        let b = array![[0.0, 1.0]];
        let weights = array![[3.0]];

        let mut state = kernel.create_state();
        kernel.eval_batch_with_state(a.view(), b.view(), &mut state);
        let gradient = kernel
            .weighted_parameter_derivative(a.view(), b.view(), weights.view(), &state)
            .unwrap();

        // d = 2, k = exp(-1), dk/dγ = -2 exp(-1)
        assert_eq!(gradient.len(), 1);
        assert_relative_eq!(gradient[0], 3.0 * -2.0 * (-1.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_parameter_derivative_matches_finite_difference() {
        let a = array![[0.3, -0.2, 0.5], [-0.7, 0.1, 0.0]];
        let b = array![[0.0, 0.4, -0.3], [0.6, -0.6, 0.2], [0.1, 0.1, 0.1]];
        let weights = array![[1.0, 0.5, -2.0], [0.25, 1.5, 1.0]];

        for unconstrained in [false, true] {
            let kernel = RbfKernel::new(0.8).with_unconstrained(unconstrained);
            let mut state = kernel.create_state();
            kernel.eval_batch_with_state(a.view(), b.view(), &mut state);
            let analytic = kernel
                .weighted_parameter_derivative(a.view(), b.view(), weights.view(), &state)
                .unwrap();

            let h = 1e-6;
            let theta = kernel.parameter_vector()[0];
            let weighted_sum = |theta: f64| {
                let mut k = kernel;
                k.set_parameter_vector(&[theta]).unwrap();
                (k.eval_batch(a.view(), b.view()) * &weights).sum()
            };
            let numeric = (weighted_sum(theta + h) - weighted_sum(theta - h)) / (2.0 * h);

            assert_relative_eq!(analytic[0], numeric, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_unconstrained_parameter_encoding() {
        let mut kernel = RbfKernel::new(2.0).with_unconstrained(true);
        assert_relative_eq!(kernel.parameter_vector()[0], 2.0_f64.ln(), epsilon = 1e-15);

        kernel.set_parameter_vector(&[0.0]).unwrap();
        assert_eq!(kernel.gamma(), 1.0);
    }

    #[test]
    fn test_set_parameter_vector_errors() {
        let mut kernel = RbfKernel::new(1.0);
        assert!(matches!(
            kernel.set_parameter_vector(&[1.0, 2.0]),
            Err(KernelError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
        assert!(matches!(
            kernel.set_parameter_vector(&[-1.0]),
            Err(KernelError::InvalidParameter(_))
        ));
        assert_eq!(kernel.gamma(), 1.0);
    }

    #[test]
    fn test_derivative_rejects_stale_state() {
        let kernel = RbfKernel::new(1.0);
        let a = array![[0.0], [1.0]];
        let b = array![[2.0]];
        let weights = array![[1.0], [1.0]];

        let state = kernel.create_state();
        let result =
            kernel.weighted_parameter_derivative(a.view(), b.view(), weights.view(), &state);
        assert!(matches!(result, Err(KernelError::DimensionMismatch { .. })));
    }
}
