//! Serializable kernel descriptions

use crate::core::{KernelError, Result};
use crate::kernel::polynomial::MAX_DEGREE;
use crate::kernel::{Kernel, LinearKernel, PolynomialKernel, RbfKernel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Description of a kernel that can be stored alongside results and rebuilt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KernelConfig {
    /// Gaussian RBF kernel exp(-γ ||x - y||²)
    Rbf {
        gamma: f64,
        #[serde(default)]
        unconstrained: bool,
    },
    /// Linear kernel <x, y>
    Linear,
    /// Polynomial kernel (γ <x, y> + coef0)^degree
    Polynomial { degree: u32, gamma: f64, coef0: f64 },
}

impl KernelConfig {
    /// Check the parameters without building the kernel
    pub fn validate(&self) -> Result<()> {
        match *self {
            KernelConfig::Rbf { gamma, .. } => check_gamma(gamma),
            KernelConfig::Linear => Ok(()),
            KernelConfig::Polynomial {
                degree,
                gamma,
                coef0,
            } => {
                if degree == 0 || degree > MAX_DEGREE {
                    return Err(KernelError::InvalidParameter(format!(
                        "polynomial degree must be between 1 and {MAX_DEGREE}, got {degree}"
                    )));
                }
                if !coef0.is_finite() {
                    return Err(KernelError::InvalidParameter(format!(
                        "coef0 must be finite, got {coef0}"
                    )));
                }
                check_gamma(gamma)
            }
        }
    }

    /// Build the described kernel
    pub fn build(&self) -> Result<Box<dyn Kernel>> {
        self.validate()?;
        let kernel: Box<dyn Kernel> = match *self {
            KernelConfig::Rbf {
                gamma,
                unconstrained,
            } => Box::new(RbfKernel::new(gamma).with_unconstrained(unconstrained)),
            KernelConfig::Linear => Box::new(LinearKernel::new()),
            KernelConfig::Polynomial {
                degree,
                gamma,
                coef0,
            } => Box::new(PolynomialKernel::new(degree, gamma, coef0)),
        };
        Ok(kernel)
    }
}

impl fmt::Display for KernelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelConfig::Rbf {
                gamma,
                unconstrained,
            } => {
                write!(f, "rbf(gamma={gamma})")?;
                if *unconstrained {
                    write!(f, " [log-encoded]")?;
                }
                Ok(())
            }
            KernelConfig::Linear => write!(f, "linear"),
            KernelConfig::Polynomial {
                degree,
                gamma,
                coef0,
            } => write!(f, "polynomial(degree={degree}, gamma={gamma}, coef0={coef0})"),
        }
    }
}

fn check_gamma(gamma: f64) -> Result<()> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(KernelError::InvalidParameter(format!(
            "gamma must be positive and finite, got {gamma}"
        )));
    }
    Ok(())
}
