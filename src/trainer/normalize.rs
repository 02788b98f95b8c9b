//! Variance normalization of kernels
//!
//! For a kernel k with feature map φ and a sample x_1..x_M, the variance of
//! the mapped sample is
//!
//! Var = (1/M) Σ_i k(x_i, x_i) - (1/M²) Σ_i Σ_j k(x_i, x_j) = trace - mean
//!
//! Scaling the kernel by 1 / Var makes that variance exactly one.

use crate::core::{Dataset, KernelError, Result};
use crate::kernel::traits::read_kernel;
use crate::kernel::{KernelFunction, ScaledKernel};
use log::{debug, info};

/// Smallest variance the trainer accepts as non-degenerate
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Sample statistics of a kernel over a dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelStatistics {
    /// (1/M²) Σ_i Σ_j k(x_i, x_j)
    pub mean: f64,
    /// (1/M) Σ_i k(x_i, x_i)
    pub trace: f64,
    /// Number of samples M
    pub samples: usize,
}

impl KernelStatistics {
    /// Compute mean and trace of `kernel` over `data`
    ///
    /// Uses symmetry: every off-diagonal pair is evaluated once and counted
    /// twice, so M(M+1)/2 evaluations in total.
    ///
    /// # Errors
    /// * `EmptyDataset` if `data` has no elements
    /// * any error raised by the kernel
    pub fn compute<K, D>(kernel: &K, data: &D) -> Result<Self>
    where
        K: KernelFunction<D::Element> + ?Sized,
        D: Dataset + ?Sized,
    {
        let m = data.len();
        if m == 0 {
            return Err(KernelError::EmptyDataset);
        }

        let mut diagonal = 0.0;
        let mut off_diagonal = 0.0;
        for i in 0..m {
            let xi = data.element(i);
            diagonal += kernel.eval(xi, xi)?;
            for j in 0..i {
                off_diagonal += kernel.eval(xi, data.element(j))?;
            }
        }

        let n = m as f64;
        Ok(Self {
            mean: (diagonal + 2.0 * off_diagonal) / (n * n),
            trace: diagonal / n,
            samples: m,
        })
    }

    /// Feature-space variance, trace - mean
    pub fn variance(&self) -> f64 {
        self.trace - self.mean
    }
}

/// Feature-space variance of `kernel` over `data`
pub fn feature_space_variance<K, D>(kernel: &K, data: &D) -> Result<f64>
where
    K: KernelFunction<D::Element> + ?Sized,
    D: Dataset + ?Sized,
{
    KernelStatistics::compute(kernel, data).map(|stats| stats.variance())
}

/// One-shot trainer setting the factor of a [`ScaledKernel`]
///
/// Statistics are taken over the *unscaled* inner kernel, so training an
/// already-normalized kernel again yields the same factor.
///
/// # Example
///
/// ```rust
/// use rmkl::kernel::{shared, to_dyn, RBFKernel, ScaledKernel};
/// use rmkl::trainer::{feature_space_variance, VarianceNormalizationTrainer};
///
/// let rbf = shared(RBFKernel::new(0.5).unwrap());
/// let mut kernel = ScaledKernel::new(to_dyn(&rbf));
/// let data = vec![0.0, 1.0, 2.5, -1.0];
///
/// let mut trainer = VarianceNormalizationTrainer::new();
/// trainer.train(&mut kernel, &data).unwrap();
///
/// let variance = feature_space_variance(&kernel, &data).unwrap();
/// assert!((variance - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct VarianceNormalizationTrainer {
    tolerance: f64,
    mean: f64,
    trace: f64,
}

impl VarianceNormalizationTrainer {
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            mean: 0.0,
            trace: 0.0,
        }
    }

    /// Set the smallest accepted variance (default 1e-10)
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Mean kernel value from the last training run
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Mean diagonal kernel value from the last training run
    pub fn trace(&self) -> f64 {
        self.trace
    }

    /// Compute the normalizing factor and write it into `kernel`
    ///
    /// Mean and trace are recorded even when training fails with
    /// `DegenerateKernel`. The kernel is left untouched on any error.
    pub fn train<D>(&mut self, kernel: &mut ScaledKernel<D::Element>, data: &D) -> Result<()>
    where
        D: Dataset + ?Sized,
    {
        let stats = {
            let inner = read_kernel(kernel.inner());
            debug!(
                "Normalizing {} kernel over {} samples",
                inner.name(),
                data.len()
            );
            KernelStatistics::compute(&*inner, data)?
        };
        self.mean = stats.mean;
        self.trace = stats.trace;

        // A negative tolerance never admits a non-positive variance
        let variance = stats.variance();
        let factor = 1.0 / variance;
        if !(variance > self.tolerance.max(0.0)) || !factor.is_finite() {
            return Err(KernelError::DegenerateKernel { variance });
        }

        kernel.set_factor(factor)?;
        info!(
            "Variance normalization: mean={:.6}, trace={:.6}, factor={:.6}",
            stats.mean,
            stats.trace,
            kernel.factor()
        );
        Ok(())
    }
}

impl Default for VarianceNormalizationTrainer {
    fn default() -> Self {
        Self::new()
    }
}
