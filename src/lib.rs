//! Composable kernel functions for multiple kernel learning
//!
//! Primitive kernels (RBF, linear, polynomial, discrete) combine into
//! weighted sums, subrange products and field-wise products over
//! heterogeneous records. Every kernel, however deeply nested, exposes one
//! flat parameter vector with per-slot adaptivity, and any kernel can be
//! rescaled to unit feature-space variance over a sample.

pub mod core;
pub mod data;
pub mod kernel;
pub mod persistence;
pub mod trainer;

// Re-export main types for convenience
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{KernelError, Result};
pub use crate::data::{CSVDataset, DenseDataset, LibSVMDataset};
pub use crate::kernel::{
    shared, to_dyn, DiscreteKernel, FieldKernel, KernelFunction, LinearKernel, MklKernel,
    Parameterized, PolynomialKernel, RBFKernel, ScaledKernel, SharedKernel, SubrangeKernel,
    WeightedSumKernel,
};
pub use crate::persistence::{KernelSpec, NormalizationReport};
pub use crate::trainer::{KernelStatistics, VarianceNormalizationTrainer};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
