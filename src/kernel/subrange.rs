//! Product of kernels acting on index subranges of a dense vector
//!
//! K(x, y) = Π_i K_i(x[lo_i..hi_i], y[lo_i..hi_i])

use crate::core::{KernelError, Result};
use crate::kernel::params::ChildSet;
use crate::kernel::traits::read_kernel;
use crate::kernel::{KernelFunction, Parameterized, SharedKernel};
use log::debug;
use std::ops::Range;

/// Product kernel over half-open index ranges of a dense input
///
/// Ranges may overlap or repeat; every child sees only its own slice. The
/// kernel has one slot per child (non-adaptive at first) and no parameters
/// of its own.
pub struct SubrangeKernel {
    dim: usize,
    ranges: Vec<Range<usize>>,
    children: ChildSet<SharedKernel<[f64]>>,
}

impl SubrangeKernel {
    /// Create a subrange kernel for inputs of dimension `dim`
    ///
    /// # Errors
    /// * `EmptyComposite` if `parts` is empty
    /// * `InvalidRange` if a range has `start > end` or `end > dim`
    pub fn new(dim: usize, parts: Vec<(SharedKernel<[f64]>, Range<usize>)>) -> Result<Self> {
        if parts.is_empty() {
            return Err(KernelError::EmptyComposite);
        }
        if let Some((_, range)) = parts
            .iter()
            .find(|(_, r)| r.start > r.end || r.end > dim)
        {
            return Err(KernelError::InvalidRange {
                start: range.start,
                end: range.end,
                dim,
            });
        }

        let (kernels, ranges): (Vec<_>, Vec<_>) = parts.into_iter().unzip();
        debug!("Subrange kernel over {} ranges of a {dim}-dim input", ranges.len());
        Ok(Self {
            dim,
            ranges,
            children: ChildSet::new(kernels),
        })
    }

    /// Declared input dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Number of child kernels
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn kernels(&self) -> impl Iterator<Item = &SharedKernel<[f64]>> {
        self.children.iter()
    }

    fn check_input(&self, x: &[f64]) -> Result<()> {
        if x.len() != self.dim {
            return Err(KernelError::DimensionMismatch {
                expected: self.dim,
                actual: x.len(),
            });
        }
        Ok(())
    }
}

impl Parameterized for SubrangeKernel {
    fn number_of_slots(&self) -> usize {
        self.len()
    }

    fn is_adaptive(&self, slot: usize) -> bool {
        self.children.is_adaptive(slot)
    }

    fn set_adaptive(&mut self, slot: usize, adaptive: bool) -> Result<()> {
        if !self.children.set_adaptive(slot, adaptive) {
            return Err(KernelError::SlotOutOfRange {
                slot,
                slots: self.len(),
            });
        }
        Ok(())
    }

    fn set_adaptive_all(&mut self, adaptive: bool) {
        self.children.set_adaptive_all(adaptive);
    }

    fn number_of_parameters(&self) -> usize {
        self.children.number_of_parameters()
    }

    fn parameter_vector(&self) -> Vec<f64> {
        let mut parameters = Vec::new();
        self.children.append_parameters(&mut parameters);
        parameters
    }

    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        self.children.check_parameter_vector(parameters)
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        self.children.set_parameter_vector(parameters)
    }
}

impl KernelFunction<[f64]> for SubrangeKernel {
    fn eval(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        self.check_input(x)?;
        self.check_input(y)?;

        let mut result = 1.0;
        for (kernel, range) in self.children.iter().zip(&self.ranges) {
            let (xs, ys) = (&x[range.clone()], &y[range.clone()]);
            result *= read_kernel(kernel).eval(xs, ys)?;
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "subrange"
    }
}
