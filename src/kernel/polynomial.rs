//! Polynomial Kernel Implementation
//!
//! The polynomial kernel is defined as:
//! K(x, y) = (γ * <x, y> + r)^d
//!
//! Where:
//! - γ (gamma): scaling factor for the dot product
//! - r (coef0): independent term in the polynomial
//! - d (degree): degree of the polynomial
//!
//! The degree is fixed at construction. γ and r form the parameter vector
//! `[γ, r]`, with partial derivatives
//! - ∂K/∂γ = d * (γ<x,y> + r)^(d-1) * <x,y>
//! - ∂K/∂r = d * (γ<x,y> + r)^(d-1)

use crate::core::{KernelError, Result};
use crate::kernel::ops::{check_weights, dot, inner_product_block};
use crate::kernel::{Kernel, KernelState};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Largest supported degree; powers are evaluated with `f64::powi`
pub const MAX_DEGREE: u32 = i32::MAX as u32;

/// Polynomial kernel with configurable degree, gamma, and coefficient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialKernel {
    gamma: f64,
    coef0: f64,
    degree: u32,
}

impl PolynomialKernel {
    /// Creates a new polynomial kernel with the specified parameters
    ///
    /// # Arguments
    /// * `degree` - Degree of the polynomial (1 to [`MAX_DEGREE`])
    /// * `gamma` - Scaling factor for the dot product (must be > 0)
    /// * `coef0` - Independent term in the polynomial
    ///
    /// # Examples
    /// ```
    /// use rkernel::kernel::PolynomialKernel;
    ///
    /// // Quadratic kernel: (x·y + 1)²
    /// let quad_kernel = PolynomialKernel::new(2, 1.0, 1.0);
    /// assert_eq!(quad_kernel.degree(), 2);
    /// ```
    pub fn new(degree: u32, gamma: f64, coef0: f64) -> Self {
        assert!(degree > 0, "Polynomial degree must be positive");
        assert!(degree <= MAX_DEGREE, "Polynomial degree {degree} exceeds {MAX_DEGREE}");
        assert!(gamma > 0.0, "Gamma must be positive");

        Self {
            gamma,
            coef0,
            degree,
        }
    }

    /// Creates a quadratic kernel: (γ * <x,y> + 1)²
    pub fn quadratic(gamma: f64) -> Self {
        Self::new(2, gamma, 1.0)
    }

    /// Creates a cubic kernel: (γ * <x,y> + 1)³
    pub fn cubic(gamma: f64) -> Self {
        Self::new(3, gamma, 1.0)
    }

    /// Creates a polynomial kernel with gamma = 1.0 / n_features
    ///
    /// # Examples
    /// ```
    /// use rkernel::kernel::PolynomialKernel;
    ///
    /// let kernel = PolynomialKernel::auto(3, 100);
    /// assert_eq!(kernel.gamma(), 0.01);
    /// ```
    pub fn auto(degree: u32, n_features: usize) -> Self {
        assert!(n_features > 0, "Number of features must be positive");
        Self::new(degree, 1.0 / n_features as f64, 1.0)
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn coef0(&self) -> f64 {
        self.coef0
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    fn base(&self, inner_product: f64) -> f64 {
        self.gamma * inner_product + self.coef0
    }

    // degree <= MAX_DEGREE, checked in `new`
    fn exponent(&self) -> i32 {
        self.degree as i32
    }
}

impl Kernel for PolynomialKernel {
    fn name(&self) -> &'static str {
        "polynomial"
    }

    fn number_of_parameters(&self) -> usize {
        2
    }

    fn parameter_vector(&self) -> Vec<f64> {
        vec![self.gamma, self.coef0]
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        if parameters.len() != 2 {
            return Err(KernelError::DimensionMismatch {
                expected: 2,
                actual: parameters.len(),
            });
        }
        let (gamma, coef0) = (parameters[0], parameters[1]);
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(KernelError::InvalidParameter(format!(
                "gamma must be positive and finite, got {gamma}"
            )));
        }
        if !coef0.is_finite() {
            return Err(KernelError::InvalidParameter(format!(
                "coef0 must be finite, got {coef0}"
            )));
        }
        self.gamma = gamma;
        self.coef0 = coef0;
        Ok(())
    }

    fn eval(&self, x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
        self.base(dot(x, y)).powi(self.exponent())
    }

    fn eval_batch_with_state(
        &self,
        a: ArrayView2<'_, f64>,
        b: ArrayView2<'_, f64>,
        state: &mut KernelState,
    ) -> Array2<f64> {
        let inner_products = inner_product_block(a, b);
        let values = inner_products.mapv(|p| self.base(p).powi(self.exponent()));
        state.store(inner_products, values.clone());
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

        let degree = self.degree as f64;
        let mut gradient = Array1::zeros(2);
        for (&w, &p) in weights.iter().zip(state.intermediate().iter()) {
            let outer = degree * self.base(p).powi(self.exponent() - 1);
            gradient[0] += w * (outer * p);
            gradient[1] += w * outer;
        }

        Ok(gradient)
    }
}
