//! Linear kernel implementation

use crate::core::{InnerProduct, KernelError, Result};
use crate::kernel::{KernelFunction, Parameterized};

/// Linear kernel: K(x, y) = x^T * y
///
/// The simplest kernel function. It has no parameters and no slots, so its
/// parameter vector is always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Parameterized for LinearKernel {
    fn number_of_slots(&self) -> usize {
        0
    }

    fn is_adaptive(&self, _slot: usize) -> bool {
        false
    }

    fn set_adaptive(&mut self, slot: usize, _adaptive: bool) -> Result<()> {
        Err(KernelError::SlotOutOfRange { slot, slots: 0 })
    }

    fn set_adaptive_all(&mut self, _adaptive: bool) {}

    fn number_of_parameters(&self) -> usize {
        0
    }

    fn parameter_vector(&self) -> Vec<f64> {
        Vec::new()
    }

    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        if !parameters.is_empty() {
            return Err(KernelError::DimensionMismatch {
                expected: 0,
                actual: parameters.len(),
            });
        }
        Ok(())
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        self.check_parameter_vector(parameters)
    }
}

impl<I: InnerProduct + ?Sized> KernelFunction<I> for LinearKernel {
    fn eval(&self, x: &I, y: &I) -> Result<f64> {
        x.dot(y)
    }

    fn name(&self) -> &str {
        "linear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;

    #[test]
    fn test_linear_kernel_sparse() {
        let kernel = LinearKernel::new();

        let x = SparseVector::new(vec![0, 2, 4], vec![1.0, 2.0, 3.0]);
        let y = SparseVector::new(vec![1, 2, 3], vec![1.0, 2.0, 3.0]);

        // Only index 2 overlaps: 2.0 * 2.0 = 4.0
        assert_eq!(kernel.eval(&x, &y).unwrap(), 4.0);
        assert_eq!(kernel.eval(&x, &x).unwrap(), 14.0);
    }

    #[test]
    fn test_linear_kernel_dense() {
        let kernel = LinearKernel::new();
        let x = [2.0, 1.0];
        let y = [-2.0, 1.0];

        assert_eq!(kernel.eval(&x[..], &y[..]).unwrap(), -3.0);
    }

    #[test]
    fn test_linear_kernel_no_overlap() {
        let kernel = LinearKernel::new();

        let x = SparseVector::new(vec![0, 2], vec![1.0, 2.0]);
        let y = SparseVector::new(vec![1, 3], vec![1.0, 2.0]);

        assert_eq!(kernel.eval(&x, &y).unwrap(), 0.0);
    }

    #[test]
    fn test_linear_kernel_has_no_parameters() {
        let mut kernel = LinearKernel::new();
        assert_eq!(kernel.number_of_slots(), 0);
        assert_eq!(kernel.number_of_parameters(), 0);
        assert!(kernel.parameter_vector().is_empty());

        kernel.set_parameter_vector(&[]).unwrap();
        assert!(matches!(
            kernel.set_parameter_vector(&[1.0]),
            Err(KernelError::DimensionMismatch { expected: 0, actual: 1 })
        ));
        assert!(kernel.set_adaptive(0, true).is_err());
    }
}
