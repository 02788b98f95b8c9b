//! RBF (Radial Basis Function) kernel implementation
//!
//! The RBF kernel is defined as: K(x, y) = exp(-γ * ||x - y||²)
//! where γ (gamma) is a hyperparameter that controls the kernel width.

use crate::core::{InnerProduct, KernelError, Result};
use crate::kernel::params::ParameterSlots;
use crate::kernel::{KernelFunction, Parameterized};

/// RBF (Radial Basis Function) kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// The gamma parameter controls the "reach" of each example:
/// - High gamma: close points have high influence
/// - Low gamma: distant points have influence
///
/// Gamma is stored raw (not log-encoded) and is the kernel's single
/// parameter slot, adaptive by default. Setting gamma <= 0 through any path
/// fails with `InvalidParameter`.
///
/// Works on any [`InnerProduct`] input: dense slices, sparse vectors, scalars.
#[derive(Debug, Clone)]
pub struct RBFKernel {
    gamma: f64,
    slots: ParameterSlots,
}

impl RBFKernel {
    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Errors
    /// `InvalidParameter` if gamma is not a positive finite number
    pub fn new(gamma: f64) -> Result<Self> {
        validate_gamma(gamma)?;
        Ok(Self {
            gamma,
            slots: ParameterSlots::new(vec![1], true),
        })
    }

    /// Create RBF kernel with gamma = 1.0 / n_features
    pub fn with_auto_gamma(n_features: usize) -> Result<Self> {
        if n_features == 0 {
            return Err(KernelError::InvalidParameter(
                "Number of features must be positive".to_string(),
            ));
        }
        Self::new(1.0 / n_features as f64)
    }

    /// Create RBF kernel with gamma = 1.0
    pub fn unit_gamma() -> Self {
        Self {
            gamma: 1.0,
            slots: ParameterSlots::new(vec![1], true),
        }
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Set gamma directly, regardless of the slot's adaptivity
    pub fn set_gamma(&mut self, gamma: f64) -> Result<()> {
        validate_gamma(gamma)?;
        self.gamma = gamma;
        Ok(())
    }
}

impl Default for RBFKernel {
    /// Default RBF kernel with gamma = 1.0
    fn default() -> Self {
        Self::unit_gamma()
    }
}

fn validate_gamma(gamma: f64) -> Result<()> {
    if !(gamma > 0.0 && gamma.is_finite()) {
        return Err(KernelError::InvalidParameter(format!(
            "Gamma must be positive, got: {gamma}"
        )));
    }
    Ok(())
}

impl Parameterized for RBFKernel {
    fn number_of_slots(&self) -> usize {
        self.slots.len()
    }

    fn is_adaptive(&self, slot: usize) -> bool {
        self.slots.is_adaptive(slot)
    }

    fn set_adaptive(&mut self, slot: usize, adaptive: bool) -> Result<()> {
        self.slots.set_adaptive(slot, adaptive)
    }

    fn set_adaptive_all(&mut self, adaptive: bool) {
        self.slots.set_all(adaptive)
    }

    fn number_of_parameters(&self) -> usize {
        self.slots.active_count()
    }

    fn parameter_vector(&self) -> Vec<f64> {
        self.slots.gather(&[self.gamma])
    }

    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        let next = self.slots.apply(&[self.gamma], parameters)?;
        validate_gamma(next[0])
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        let next = self.slots.apply(&[self.gamma], parameters)?;
        validate_gamma(next[0])?;
        self.gamma = next[0];
        Ok(())
    }
}

impl<I: InnerProduct + ?Sized> KernelFunction<I> for RBFKernel {
    fn eval(&self, x: &I, y: &I) -> Result<f64> {
        let squared_distance = x.squared_distance(y)?;
        Ok((-self.gamma * squared_distance).exp())
    }

    fn name(&self) -> &str {
        "rbf"
    }
}
