//! Polynomial Kernel Implementation
//!
//! The polynomial kernel is defined as:
//! K(x, y) = (<x, y> + c)^d
//!
//! Where:
//! - c (offset): independent term, a real parameter
//! - d (degree): integer degree, fixed at construction
//!
//! Common configurations:
//! - Quadratic kernel: d=2, c=1
//! - Cubic kernel: d=3, c=1

use crate::core::{InnerProduct, KernelError, Result};
use crate::kernel::params::ParameterSlots;
use crate::kernel::{KernelFunction, Parameterized};

const DEGREE_SLOT: usize = 0;
const OFFSET_SLOT: usize = 1;

/// Polynomial kernel with fixed integer degree and adaptive offset
///
/// Slot 0 is the degree. It is an integer, holds no real parameters and
/// never shows up in the parameter vector, whatever its flag says. Slot 1 is
/// the offset, adaptive by default.
#[derive(Debug, Clone)]
pub struct PolynomialKernel {
    degree: u32,
    offset: f64,
    slots: ParameterSlots,
}

impl PolynomialKernel {
    /// Creates a new polynomial kernel
    ///
    /// # Arguments
    /// * `degree` - Degree of the polynomial (must be > 0)
    /// * `offset` - Independent term (must be >= 0)
    ///
    /// # Examples
    /// ```
    /// use rmkl::kernel::PolynomialKernel;
    ///
    /// // Quadratic kernel: (x·y + 1)²
    /// let quad_kernel = PolynomialKernel::new(2, 1.0).unwrap();
    /// assert_eq!(quad_kernel.degree(), 2);
    /// ```
    pub fn new(degree: u32, offset: f64) -> Result<Self> {
        if degree == 0 {
            return Err(KernelError::InvalidParameter(
                "Polynomial degree must be positive".to_string(),
            ));
        }
        if i32::try_from(degree).is_err() {
            return Err(KernelError::InvalidParameter(format!(
                "Polynomial degree too large: {degree}"
            )));
        }
        validate_offset(offset)?;

        let mut slots = ParameterSlots::new(vec![0, 1], true);
        slots.set_adaptive(DEGREE_SLOT, false)?;

        Ok(Self {
            degree,
            offset,
            slots,
        })
    }

    /// Creates a quadratic kernel: (<x,y> + c)²
    pub fn quadratic(offset: f64) -> Result<Self> {
        Self::new(2, offset)
    }

    /// Creates a cubic kernel: (<x,y> + c)³
    pub fn cubic(offset: f64) -> Result<Self> {
        Self::new(3, offset)
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

fn validate_offset(offset: f64) -> Result<()> {
    if !(offset >= 0.0 && offset.is_finite()) {
        return Err(KernelError::InvalidParameter(format!(
            "Polynomial offset must be non-negative, got: {offset}"
        )));
    }
    Ok(())
}

impl Parameterized for PolynomialKernel {
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
        self.slots.gather(&[self.offset])
    }

    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        let next = self.slots.apply(&[self.offset], parameters)?;
        validate_offset(next[0])
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        let next = self.slots.apply(&[self.offset], parameters)?;
        validate_offset(next[0])?;
        self.offset = next[0];
        Ok(())
    }
}

impl<I: InnerProduct + ?Sized> KernelFunction<I> for PolynomialKernel {
    fn eval(&self, x: &I, y: &I) -> Result<f64> {
        let base = x.dot(y)? + self.offset;
        Ok(base.powi(self.degree as i32))
    }

    fn name(&self) -> &str {
        "polynomial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;
    use approx::assert_relative_eq;

    #[test]
    fn test_polynomial_kernel_creation() {
        let kernel = PolynomialKernel::new(3, 0.5).unwrap();
        assert_eq!(kernel.degree(), 3);
        assert_eq!(kernel.offset(), 0.5);

        let quad = PolynomialKernel::quadratic(1.0).unwrap();
        assert_eq!(quad.degree(), 2);
        let cubic = PolynomialKernel::cubic(1.0).unwrap();
        assert_eq!(cubic.degree(), 3);
    }

    #[test]
    fn test_polynomial_kernel_computation() {
        let kernel = PolynomialKernel::new(2, 1.0).unwrap();

        let x = [1.0, 2.0];
        let y = [2.0, 1.0];

        // (1*2 + 2*1 + 1)² = 25
        assert_relative_eq!(kernel.eval(&x[..], &y[..]).unwrap(), 25.0, epsilon = 1e-10);
    }

    #[test]
    fn test_polynomial_kernel_sparse_vectors() {
        let kernel = PolynomialKernel::new(2, 0.0).unwrap();

        let x = SparseVector::new(vec![0, 2, 5], vec![1.0, 2.0, 3.0]);
        let y = SparseVector::new(vec![1, 2, 4], vec![1.0, 2.0, 3.0]);

        // Only index 2 overlaps: (4)² = 16
        assert_relative_eq!(kernel.eval(&x, &y).unwrap(), 16.0, epsilon = 1e-10);
    }

    #[test]
    fn test_polynomial_kernel_zero_vectors() {
        let kernel = PolynomialKernel::new(2, 1.0).unwrap();
        let zero = [0.0; 3];
        assert_eq!(kernel.eval(&zero[..], &zero[..]).unwrap(), 1.0);
    }

    #[test]
    fn test_polynomial_kernel_high_degree() {
        let kernel = PolynomialKernel::new(5, 1.0).unwrap();

        // (0.6 + 1)⁵
        assert_relative_eq!(kernel.eval(&0.2, &3.0).unwrap(), 10.48576, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(matches!(
            PolynomialKernel::new(0, 1.0),
            Err(KernelError::InvalidParameter(_))
        ));
        assert!(matches!(
            PolynomialKernel::new(2, -1.0),
            Err(KernelError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_degree_must_fit_exponent() {
        assert!(matches!(
            PolynomialKernel::new(u32::MAX, 1.0),
            Err(KernelError::InvalidParameter(_))
        ));
        let kernel = PolynomialKernel::new(i32::MAX as u32, 1.0).unwrap();
        assert_eq!(kernel.eval(&1.0, &1.0).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_degree_slot_never_exposed() {
        let mut kernel = PolynomialKernel::new(2, 1.0).unwrap();
        assert_eq!(kernel.number_of_slots(), 2);
        assert!(!kernel.is_adaptive(0));
        assert!(kernel.is_adaptive(1));
        assert_eq!(kernel.parameter_vector(), vec![1.0]);

        kernel.set_adaptive_all(true);
        assert!(kernel.is_adaptive(0));
        assert_eq!(kernel.number_of_parameters(), 1);

        kernel.set_adaptive(1, false).unwrap();
        assert_eq!(kernel.number_of_parameters(), 0);
    }

    #[test]
    fn test_offset_through_parameter_vector() {
        let mut kernel = PolynomialKernel::new(2, 1.0).unwrap();
        kernel.set_parameter_vector(&[3.0]).unwrap();
        assert_eq!(kernel.offset(), 3.0);

        assert!(kernel.set_parameter_vector(&[-0.5]).is_err());
        assert_eq!(kernel.offset(), 3.0);
    }
}
