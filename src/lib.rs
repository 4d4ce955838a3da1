//! Kernel matrix helpers for kernel methods
//!
//! Builds regularized kernel (Gram) matrices and weighted kernel parameter
//! derivatives over batched datasets of dense points.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod helpers;
pub mod kernel;
pub mod persistence;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::KernelHelper;
pub use crate::cache::{CacheStats, RowCache};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{KernelError, Result};
pub use crate::data::BatchedDataset;
pub use crate::helpers::{
    calculate_kernel_matrix, calculate_kernel_matrix_parameter_derivative,
    calculate_mixed_kernel_matrix, calculate_regularized_kernel_matrix, CachedKernelMatrix,
};
pub use crate::kernel::{
    Kernel, KernelConfig, KernelState, LinearKernel, PolynomialKernel, RbfKernel,
};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
