//! Weighted sum of kernels evaluated on the same input
//!
//! K(x, y) = Σ_i w_i * K_i(x, y)

use crate::core::{KernelError, Result};
use crate::kernel::params::{ChildSet, ParameterSlots};
use crate::kernel::traits::read_kernel;
use crate::kernel::{KernelFunction, Parameterized, SharedKernel};
use log::debug;

/// Weighted sum of child kernels sharing one input type
///
/// Slots `0..n` are the weights (one real each), slots `n..2n` are the
/// children. Everything starts non-adaptive. The parameter vector lists the
/// adaptive weights first, then the parameters of each adaptive child in
/// child order.
///
/// Weights are not constrained to be nonnegative or to sum to one.
///
/// # Example
///
/// ```rust
/// use rmkl::kernel::{shared, to_dyn, KernelFunction, Parameterized, RBFKernel, SharedKernel, WeightedSumKernel};
///
/// let narrow = shared(RBFKernel::new(0.1).unwrap());
/// let wide = shared(RBFKernel::new(0.01).unwrap());
/// let children: Vec<SharedKernel<[f64]>> = vec![to_dyn(&narrow), to_dyn(&wide)];
/// let mut kernel = WeightedSumKernel::new(children).unwrap();
///
/// assert_eq!(kernel.number_of_parameters(), 0);
/// kernel.set_adaptive_all(true);
/// assert_eq!(kernel.number_of_parameters(), 4);
///
/// let x = [2.0, 1.0];
/// let y = [-2.0, 1.0];
/// let value = kernel.eval(&x[..], &y[..]).unwrap();
/// assert!(value > 0.0);
/// ```
pub struct WeightedSumKernel<I: ?Sized> {
    weights: Vec<f64>,
    weight_slots: ParameterSlots,
    children: ChildSet<SharedKernel<I>>,
}

impl<I: ?Sized> WeightedSumKernel<I> {
    /// Create a weighted sum with every weight set to 1.0
    pub fn new(kernels: Vec<SharedKernel<I>>) -> Result<Self> {
        let weights = vec![1.0; kernels.len()];
        Self::with_weights(kernels, weights)
    }

    /// Create a weighted sum with explicit initial weights
    ///
    /// # Errors
    /// * `EmptyComposite` if `kernels` is empty
    /// * `DimensionMismatch` if there is not exactly one weight per kernel
    /// * `InvalidParameter` if a weight is not finite
    pub fn with_weights(kernels: Vec<SharedKernel<I>>, weights: Vec<f64>) -> Result<Self> {
        if kernels.is_empty() {
            return Err(KernelError::EmptyComposite);
        }
        if kernels.len() != weights.len() {
            return Err(KernelError::DimensionMismatch {
                expected: kernels.len(),
                actual: weights.len(),
            });
        }
        validate_weights(&weights)?;

        debug!("Weighted sum kernel over {} children", kernels.len());
        Ok(Self {
            weight_slots: ParameterSlots::new(vec![1; weights.len()], false),
            weights,
            children: ChildSet::new(kernels),
        })
    }

    /// Number of child kernels
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Slot index of the weight of child `index`
    pub fn weight_slot(&self, index: usize) -> usize {
        index
    }

    /// Slot index of child `index`
    pub fn kernel_slot(&self, index: usize) -> usize {
        self.len() + index
    }

    pub fn kernels(&self) -> impl Iterator<Item = &SharedKernel<I>> {
        self.children.iter()
    }

    fn own_count(&self) -> usize {
        self.weight_slots.active_count()
    }

    /// Validate and split; returns the new weight list
    fn prepare(&self, parameters: &[f64]) -> Result<Vec<f64>> {
        let expected = self.number_of_parameters();
        if parameters.len() != expected {
            return Err(KernelError::DimensionMismatch {
                expected,
                actual: parameters.len(),
            });
        }
        let (own, rest) = parameters.split_at(self.own_count());
        let weights = self.weight_slots.apply(&self.weights, own)?;
        validate_weights(&weights)?;
        self.children.check_parameter_vector(rest)?;
        Ok(weights)
    }
}

fn validate_weights(weights: &[f64]) -> Result<()> {
    if let Some(w) = weights.iter().find(|w| !w.is_finite()) {
        return Err(KernelError::InvalidParameter(format!(
            "Kernel weight must be finite, got: {w}"
        )));
    }
    Ok(())
}

impl<I: ?Sized> Parameterized for WeightedSumKernel<I> {
    fn number_of_slots(&self) -> usize {
        2 * self.len()
    }

    fn is_adaptive(&self, slot: usize) -> bool {
        if slot < self.len() {
            self.weight_slots.is_adaptive(slot)
        } else {
            self.children.is_adaptive(slot - self.len())
        }
    }

    fn set_adaptive(&mut self, slot: usize, adaptive: bool) -> Result<()> {
        let n = self.len();
        if slot < n {
            return self.weight_slots.set_adaptive(slot, adaptive);
        }
        if !self.children.set_adaptive(slot - n, adaptive) {
            return Err(KernelError::SlotOutOfRange {
                slot,
                slots: 2 * n,
            });
        }
        Ok(())
    }

    fn set_adaptive_all(&mut self, adaptive: bool) {
        self.weight_slots.set_all(adaptive);
        self.children.set_adaptive_all(adaptive);
    }

    fn number_of_parameters(&self) -> usize {
        self.own_count() + self.children.number_of_parameters()
    }

    fn parameter_vector(&self) -> Vec<f64> {
        let mut parameters = self.weight_slots.gather(&self.weights);
        self.children.append_parameters(&mut parameters);
        parameters
    }

    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        self.prepare(parameters).map(|_| ())
    }

    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()> {
        let weights = self.prepare(parameters)?;
        self.children
            .set_parameter_vector(&parameters[self.own_count()..])?;
        self.weights = weights;
        debug!("Weighted sum kernel: applied {} parameters", parameters.len());
        Ok(())
    }
}

impl<I: ?Sized> KernelFunction<I> for WeightedSumKernel<I> {
    fn eval(&self, x: &I, y: &I) -> Result<f64> {
        let mut result = 0.0;
        for (kernel, &weight) in self.children.iter().zip(&self.weights) {
            result += weight * read_kernel(kernel).eval(x, y)?;
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "weighted_sum"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{shared, to_dyn, LinearKernel, PolynomialKernel, RBFKernel};
    use approx::assert_relative_eq;

    fn two_rbf() -> WeightedSumKernel<[f64]> {
        let k1 = shared(RBFKernel::new(0.1).unwrap());
        let k2 = shared(RBFKernel::new(0.01).unwrap());
        let children: Vec<SharedKernel<[f64]>> = vec![to_dyn(&k1), to_dyn(&k2)];
        WeightedSumKernel::new(children).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let kernel = two_rbf();
        assert_eq!(kernel.len(), 2);
        assert_eq!(kernel.number_of_slots(), 4);
        assert!((0..4).all(|slot| !kernel.is_adaptive(slot)));
        assert_eq!(kernel.number_of_parameters(), 0);
        assert!(kernel.parameter_vector().is_empty());
        assert_eq!(kernel.weights(), &[1.0, 1.0]);
    }

    #[test]
    fn test_eval_is_weighted_sum() {
        let rbf = shared(RBFKernel::new(0.1).unwrap());
        let poly = shared(PolynomialKernel::new(2, 1.0).unwrap());
        let children: Vec<SharedKernel<[f64]>> = vec![to_dyn(&rbf), to_dyn(&poly)];
        let kernel = WeightedSumKernel::with_weights(children, vec![0.3, -2.0]).unwrap();

        let x = [1.0, -1.0, 0.5];
        let y = [0.5, 2.0, -1.0];
        let expected = 0.3 * read_kernel(&rbf).eval(&x[..], &y[..]).unwrap()
            - 2.0 * read_kernel(&poly).eval(&x[..], &y[..]).unwrap();
        assert_relative_eq!(kernel.eval(&x[..], &y[..]).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_weight_slots_then_children() {
        let mut kernel = two_rbf();

        kernel.set_adaptive(kernel.weight_slot(1), true).unwrap();
        assert_eq!(kernel.parameter_vector(), vec![1.0]);

        kernel.set_adaptive(kernel.kernel_slot(0), true).unwrap();
        assert_eq!(kernel.parameter_vector(), vec![1.0, 0.1]);

        kernel.set_parameter_vector(&[0.5, 0.2]).unwrap();
        assert_eq!(kernel.weights(), &[1.0, 0.5]);
        assert_eq!(kernel.parameter_vector(), vec![0.5, 0.2]);
    }

    #[test]
    fn test_set_adaptive_all_counts_everything() {
        let rbf = shared(RBFKernel::new(0.1).unwrap());
        let poly = shared(PolynomialKernel::new(2, 1.0).unwrap());
        let linear = shared(LinearKernel::new());
        let children: Vec<SharedKernel<[f64]>> =
            vec![to_dyn(&rbf), to_dyn(&poly), to_dyn(&linear)];
        let mut kernel = WeightedSumKernel::new(children).unwrap();

        kernel.set_adaptive_all(true);
        // 3 weights + gamma + offset (degree slot holds nothing)
        assert_eq!(kernel.number_of_parameters(), 5);
        assert_eq!(kernel.parameter_vector(), vec![1.0, 1.0, 1.0, 0.1, 1.0]);
    }

    #[test]
    fn test_shared_child_sees_composite_update() {
        let rbf = shared(RBFKernel::new(0.1).unwrap());
        let children: Vec<SharedKernel<[f64]>> = vec![to_dyn(&rbf)];
        let mut kernel = WeightedSumKernel::new(children).unwrap();
        kernel.set_adaptive(kernel.kernel_slot(0), true).unwrap();

        kernel.set_parameter_vector(&[0.7]).unwrap();
        assert_eq!(read_kernel(&rbf).gamma(), 0.7);
    }

    #[test]
    fn test_failed_update_changes_nothing() {
        let mut kernel = two_rbf();
        kernel.set_adaptive_all(true);
        let before = kernel.parameter_vector();

        // Valid weights, invalid second gamma
        let result = kernel.set_parameter_vector(&[2.0, 3.0, 0.5, -1.0]);
        assert!(matches!(result, Err(KernelError::InvalidParameter(_))));
        assert_eq!(kernel.parameter_vector(), before);

        assert!(matches!(
            kernel.set_parameter_vector(&[1.0]),
            Err(KernelError::DimensionMismatch { expected: 4, actual: 1 })
        ));
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            WeightedSumKernel::<[f64]>::new(Vec::new()),
            Err(KernelError::EmptyComposite)
        ));

        let rbf = shared(RBFKernel::new(0.1).unwrap());
        let children: Vec<SharedKernel<[f64]>> = vec![to_dyn(&rbf)];
        assert!(matches!(
            WeightedSumKernel::with_weights(children, vec![1.0, 2.0]),
            Err(KernelError::DimensionMismatch { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut kernel = two_rbf();
        assert!(!kernel.is_adaptive(10));
        assert!(matches!(
            kernel.set_adaptive(4, true),
            Err(KernelError::SlotOutOfRange { slot: 4, slots: 4 })
        ));
    }
}
