//! Discrete kernel over small nonnegative integer inputs
//!
//! K(i, j) = M[i][j] for a fixed symmetric matrix M.

use crate::core::{KernelError, Result};
use crate::kernel::params::ParameterSlots;
use crate::kernel::{KernelFunction, Parameterized};

const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// Kernel given by lookup in a square symmetric matrix
///
/// The matrix is fixed: the kernel has a single `matrix` slot holding zero
/// real parameters, so its parameter vector is always empty.
#[derive(Debug, Clone)]
pub struct DiscreteKernel {
    matrix: Vec<Vec<f64>>,
    slots: ParameterSlots,
}

impl DiscreteKernel {
    /// Create a discrete kernel from a square symmetric matrix
    ///
    /// # Errors
    /// * `DimensionMismatch` if a row length differs from the row count
    /// * `InvalidParameter` if the matrix is not symmetric or has
    ///   non-finite entries
    pub fn new(matrix: Vec<Vec<f64>>) -> Result<Self> {
        let n = matrix.len();
        if let Some(row) = matrix.iter().find(|row| row.len() != n) {
            return Err(KernelError::DimensionMismatch {
                expected: n,
                actual: row.len(),
            });
        }

        for i in 0..n {
            for j in 0..i {
                let (a, b) = (matrix[i][j], matrix[j][i]);
                if !a.is_finite() || !b.is_finite() {
                    return Err(KernelError::InvalidParameter(format!(
                        "Matrix entry ({i}, {j}) is not finite"
                    )));
                }
                if (a - b).abs() > SYMMETRY_TOLERANCE {
                    return Err(KernelError::InvalidParameter(format!(
                        "Matrix is not symmetric at ({i}, {j}): {a} vs {b}"
                    )));
                }
            }
            if !matrix[i][i].is_finite() {
                return Err(KernelError::InvalidParameter(format!(
                    "Matrix entry ({i}, {i}) is not finite"
                )));
            }
        }

        Ok(Self {
            matrix,
            slots: ParameterSlots::new(vec![0], false),
        })
    }

    /// Number of distinct input values
    pub fn size(&self) -> usize {
        self.matrix.len()
    }

    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.size() {
            return Err(KernelError::IndexOutOfRange {
                index,
                size: self.size(),
            });
        }
        Ok(())
    }
}

impl Parameterized for DiscreteKernel {
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
        0
    }

    fn parameter_vector(&self) -> Vec<f64> {
        Vec::new()
    }

    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        self.slots.apply(&[], parameters).map(|_| ())
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        self.check_parameter_vector(parameters)
    }
}

impl KernelFunction<usize> for DiscreteKernel {
    fn eval(&self, x: &usize, y: &usize) -> Result<f64> {
        self.check_index(*x)?;
        self.check_index(*y)?;
        Ok(self.matrix[*x][*y])
    }

    fn name(&self) -> &str {
        "discrete"
    }
}
