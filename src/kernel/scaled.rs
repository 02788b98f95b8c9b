//! Kernel multiplied by a nonnegative scale factor
//!
//! K(x, y) = s * K_inner(x, y)

use crate::core::{KernelError, Result};
use crate::kernel::params::{ChildSet, ParameterSlots};
use crate::kernel::traits::read_kernel;
use crate::kernel::{KernelFunction, Parameterized, SharedKernel};
use log::debug;

const FACTOR_SLOT: usize = 0;
const INNER_SLOT: usize = 1;

/// Wraps a kernel and multiplies it by a scale factor
///
/// Slot 0 is the factor (non-adaptive by default), slot 1 is the wrapped
/// kernel (adaptive by default), so a fresh scaled kernel exposes exactly
/// the parameters of its inner kernel.
pub struct ScaledKernel<I: ?Sized> {
    factor: f64,
    factor_slot: ParameterSlots,
    inner: SharedKernel<I>,
    child: ChildSet<SharedKernel<I>>,
}

impl<I: ?Sized> ScaledKernel<I> {
    /// Wrap `inner` with a factor of 1.0
    pub fn new(inner: SharedKernel<I>) -> Self {
        let mut child = ChildSet::new(vec![inner.clone()]);
        child.set_adaptive(0, true);
        Self {
            factor: 1.0,
            factor_slot: ParameterSlots::new(vec![1], false),
            inner,
            child,
        }
    }

    /// Wrap `inner` with an explicit initial factor
    pub fn with_factor(inner: SharedKernel<I>, factor: f64) -> Result<Self> {
        let mut kernel = Self::new(inner);
        kernel.set_factor(factor)?;
        Ok(kernel)
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Set the factor directly, regardless of the slot's adaptivity
    ///
    /// # Errors
    /// `InvalidParameter` if `factor` is negative or not finite
    pub fn set_factor(&mut self, factor: f64) -> Result<()> {
        validate_factor(factor)?;
        debug!("Scaled kernel: factor {} -> {factor}", self.factor);
        self.factor = factor;
        Ok(())
    }

    /// Handle to the wrapped kernel
    pub fn inner(&self) -> &SharedKernel<I> {
        &self.inner
    }

    /// Evaluate the wrapped kernel without the factor
    pub fn eval_unscaled(&self, x: &I, y: &I) -> Result<f64> {
        read_kernel(&self.inner).eval(x, y)
    }

    fn own_count(&self) -> usize {
        self.factor_slot.active_count()
    }

    fn prepare(&self, parameters: &[f64]) -> Result<f64> {
        let expected = self.number_of_parameters();
        if parameters.len() != expected {
            return Err(KernelError::DimensionMismatch {
                expected,
                actual: parameters.len(),
            });
        }
        let (own, rest) = parameters.split_at(self.own_count());
        let factor = self.factor_slot.apply(&[self.factor], own)?[0];
        validate_factor(factor)?;
        self.child.check_parameter_vector(rest)?;
        Ok(factor)
    }
}

fn validate_factor(factor: f64) -> Result<()> {
    if !(factor >= 0.0 && factor.is_finite()) {
        return Err(KernelError::InvalidParameter(format!(
            "Scale factor must be non-negative, got: {factor}"
        )));
    }
    Ok(())
}

impl<I: ?Sized> Parameterized for ScaledKernel<I> {
    fn number_of_slots(&self) -> usize {
        2
    }

    fn is_adaptive(&self, slot: usize) -> bool {
        match slot {
            FACTOR_SLOT => self.factor_slot.is_adaptive(0),
            INNER_SLOT => self.child.is_adaptive(0),
            _ => false,
        }
    }

    fn set_adaptive(&mut self, slot: usize, adaptive: bool) -> Result<()> {
        match slot {
            FACTOR_SLOT => self.factor_slot.set_adaptive(0, adaptive),
            INNER_SLOT => {
                self.child.set_adaptive(0, adaptive);
                Ok(())
            }
            _ => Err(KernelError::SlotOutOfRange { slot, slots: 2 }),
        }
    }

    fn set_adaptive_all(&mut self, adaptive: bool) {
        self.factor_slot.set_all(adaptive);
        self.child.set_adaptive_all(adaptive);
    }

    fn number_of_parameters(&self) -> usize {
        self.own_count() + self.child.number_of_parameters()
    }

    fn parameter_vector(&self) -> Vec<f64> {
        let mut parameters = self.factor_slot.gather(&[self.factor]);
        self.child.append_parameters(&mut parameters);
        parameters
    }

    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        self.prepare(parameters).map(|_| ())
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        let factor = self.prepare(parameters)?;
        self.child
            .set_parameter_vector(&parameters[self.own_count()..])?;
        self.factor = factor;
        Ok(())
    }
}

impl<I: ?Sized> KernelFunction<I> for ScaledKernel<I> {
    fn eval(&self, x: &I, y: &I) -> Result<f64> {
        Ok(self.factor * self.eval_unscaled(x, y)?)
    }

    fn name(&self) -> &str {
        "scaled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{shared, to_dyn, LinearKernel, RBFKernel};
    use approx::assert_relative_eq;

    fn scaled_rbf() -> (ScaledKernel<[f64]>, std::sync::Arc<std::sync::RwLock<RBFKernel>>) {
        let rbf = shared(RBFKernel::new(0.1).unwrap());
        (ScaledKernel::new(to_dyn(&rbf)), rbf)
    }

    #[test]
    fn test_default_slots() {
        let (kernel, _) = scaled_rbf();
        assert_eq!(kernel.factor(), 1.0);
        assert_eq!(kernel.number_of_slots(), 2);
        assert!(!kernel.is_adaptive(0));
        assert!(kernel.is_adaptive(1));
        assert!(!kernel.is_adaptive(2));
        assert_eq!(kernel.parameter_vector(), vec![0.1]);
    }

    #[test]
    fn test_eval_scales_inner() {
        let linear = shared(LinearKernel::new());
        let kernel = ScaledKernel::with_factor(to_dyn(&linear), 2.5).unwrap();
        let x = [1.0, 2.0];
        let y = [3.0, -1.0];
        assert_relative_eq!(kernel.eval(&x[..], &y[..]).unwrap(), 2.5, epsilon = 1e-12);
        assert_relative_eq!(kernel.eval_unscaled(&x[..], &y[..]).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_factor_first_in_parameter_vector() {
        let (mut kernel, rbf) = scaled_rbf();
        kernel.set_adaptive(0, true).unwrap();
        assert_eq!(kernel.parameter_vector(), vec![1.0, 0.1]);

        kernel.set_parameter_vector(&[3.0, 0.2]).unwrap();
        assert_eq!(kernel.factor(), 3.0);
        assert_eq!(read_kernel(&rbf).gamma(), 0.2);
    }

    #[test]
    fn test_negative_factor_rejected() {
        let (mut kernel, _) = scaled_rbf();
        assert!(matches!(
            kernel.set_factor(-1.0),
            Err(KernelError::InvalidParameter(_))
        ));
        assert!(ScaledKernel::with_factor(kernel.inner().clone(), f64::NAN).is_err());

        kernel.set_adaptive(0, true).unwrap();
        assert!(kernel.set_parameter_vector(&[-2.0, 0.2]).is_err());
        assert_eq!(kernel.parameter_vector(), vec![1.0, 0.1]);
    }

    #[test]
    fn test_zero_factor_allowed() {
        let (mut kernel, _) = scaled_rbf();
        kernel.set_factor(0.0).unwrap();
        let x = [1.0];
        assert_eq!(kernel.eval(&x[..], &x[..]).unwrap(), 0.0);
    }

    #[test]
    fn test_freeze_inner() {
        let (mut kernel, _) = scaled_rbf();
        kernel.set_adaptive(1, false).unwrap();
        assert_eq!(kernel.number_of_parameters(), 0);
        kernel.set_parameter_vector(&[]).unwrap();
        assert!(matches!(
            kernel.set_adaptive(2, true),
            Err(KernelError::SlotOutOfRange { slot: 2, slots: 2 })
        ));
    }
}
