//! Core type definitions

use crate::core::{KernelError, Result};

/// Default number of points per batch
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Configuration for the high-level kernel helper
#[derive(Debug, Clone, PartialEq)]
pub struct HelperConfig {
    /// Value added to the diagonal of the kernel matrix
    pub regularization: f64,
    /// Number of points per batch when building datasets
    pub batch_size: usize,
    /// Row cache size in bytes for lazily evaluated kernel matrices
    pub cache_size: usize,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            regularization: 0.0,
            batch_size: DEFAULT_BATCH_SIZE,
            cache_size: 16 * 1024 * 1024, // 16MB
        }
    }
}

impl HelperConfig {
    /// Check that every field holds a usable value
    pub fn validate(&self) -> Result<()> {
        check_regularization(self.regularization)?;
        check_batch_size(self.batch_size)?;
        Ok(())
    }
}

/// Regularization must be finite and non-negative
pub fn check_regularization(regularization: f64) -> Result<()> {
    if !regularization.is_finite() || regularization < 0.0 {
        return Err(KernelError::InvalidParameter(format!(
            "regularization must be a finite non-negative number, got {regularization}"
        )));
    }
    Ok(())
}

/// Batches must hold at least one point
pub fn check_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(KernelError::InvalidParameter(
            "batch size must be positive".to_string(),
        ));
    }
    Ok(())
}
