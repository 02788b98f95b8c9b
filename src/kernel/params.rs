//! Parameter slot bookkeeping for leaf and composite kernels
//!
//! Leaf kernels keep all their raw parameters in one fixed-order vector and
//! describe it with a [`ParameterSlots`] table (slot -> size, slot -> flag).
//! Composites additionally keep a [`ChildSet`] with one flag per child; a
//! child slot carries whatever the child currently exposes.

use crate::core::{KernelError, Result};
use crate::kernel::traits::{read_kernel, write_kernel, Parameterized};
use std::sync::{Arc, RwLock};

/// Fixed-order table of parameter slots
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSlots {
    sizes: Vec<usize>,
    adaptive: Vec<bool>,
}

impl ParameterSlots {
    /// Create a table with the given slot sizes, all set to `adaptive`
    pub fn new(sizes: Vec<usize>, adaptive: bool) -> Self {
        let adaptive = vec![adaptive; sizes.len()];
        Self { sizes, adaptive }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Number of raw parameters across all slots, adaptive or not
    pub fn total_size(&self) -> usize {
        self.sizes.iter().sum()
    }

    pub fn is_adaptive(&self, slot: usize) -> bool {
        self.adaptive.get(slot).copied().unwrap_or(false)
    }

    pub fn set_adaptive(&mut self, slot: usize, adaptive: bool) -> Result<()> {
        let slots = self.len();
        let flag = self
            .adaptive
            .get_mut(slot)
            .ok_or(KernelError::SlotOutOfRange { slot, slots })?;
        *flag = adaptive;
        Ok(())
    }

    pub fn set_all(&mut self, adaptive: bool) {
        self.adaptive.iter_mut().for_each(|flag| *flag = adaptive);
    }

    /// Number of raw parameters in adaptive slots
    pub fn active_count(&self) -> usize {
        self.sizes
            .iter()
            .zip(&self.adaptive)
            .filter(|(_, &on)| on)
            .map(|(&size, _)| size)
            .sum()
    }

    /// Pick the adaptive entries out of the full raw parameter list
    pub fn gather(&self, values: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.active_count());
        let mut offset = 0;
        for (&size, &on) in self.sizes.iter().zip(&self.adaptive) {
            if on {
                out.extend_from_slice(&values[offset..offset + size]);
            }
            offset += size;
        }
        out
    }

    /// Return a copy of `values` with the adaptive entries replaced by `active`
    ///
    /// Frozen entries are carried over unchanged.
    pub fn apply(&self, values: &[f64], active: &[f64]) -> Result<Vec<f64>> {
        let expected = self.active_count();
        if active.len() != expected {
            return Err(KernelError::DimensionMismatch {
                expected,
                actual: active.len(),
            });
        }

        let mut next = values.to_vec();
        let mut offset = 0;
        let mut cursor = 0;
        for (&size, &on) in self.sizes.iter().zip(&self.adaptive) {
            if on {
                next[offset..offset + size].copy_from_slice(&active[cursor..cursor + size]);
                cursor += size;
            }
            offset += size;
        }
        Ok(next)
    }
}

/// Parameter access through a child handle
///
/// Implemented for every lock-wrapped kernel and for the field bindings of
/// heterogeneous kernels, so all composites share one [`ChildSet`].
pub trait KernelNode: Send + Sync {
    fn number_of_parameters(&self) -> usize;
    fn parameter_vector(&self) -> Vec<f64>;
    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()>;
    fn set_parameter_vector(&self, parameters: &[f64]) -> Result<()>;
    fn set_adaptive_all(&self, adaptive: bool);
}

impl<P: Parameterized + ?Sized> KernelNode for Arc<RwLock<P>> {
    fn number_of_parameters(&self) -> usize {
        read_kernel(self).number_of_parameters()
    }

    fn parameter_vector(&self) -> Vec<f64> {
        read_kernel(self).parameter_vector()
    }

    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        read_kernel(self).check_parameter_vector(parameters)
    }

    fn set_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        write_kernel(self).set_parameter_vector(parameters)
    }

    fn set_adaptive_all(&self, adaptive: bool) {
        write_kernel(self).set_adaptive_all(adaptive)
    }
}

/// Ordered children of a composite, each with its own adaptivity flag
///
/// Children start non-adaptive: a fresh composite exposes only what its own
/// slots expose.
pub struct ChildSet<C> {
    children: Vec<C>,
    adaptive: Vec<bool>,
}

impl<C: KernelNode> ChildSet<C> {
    pub fn new(children: Vec<C>) -> Self {
        let adaptive = vec![false; children.len()];
        Self { children, adaptive }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.children.iter()
    }

    pub fn is_adaptive(&self, index: usize) -> bool {
        self.adaptive.get(index).copied().unwrap_or(false)
    }

    /// Set the flag of child `index`; returns `false` if there is no such child
    pub fn set_adaptive(&mut self, index: usize, adaptive: bool) -> bool {
        match self.adaptive.get_mut(index) {
            Some(flag) => {
                *flag = adaptive;
                true
            }
            None => false,
        }
    }

    /// Set every child flag and recurse into the children
    pub fn set_adaptive_all(&mut self, adaptive: bool) {
        self.adaptive.iter_mut().for_each(|flag| *flag = adaptive);
        for child in &self.children {
            child.set_adaptive_all(adaptive);
        }
    }

    fn active(&self) -> impl Iterator<Item = &C> {
        self.children
            .iter()
            .zip(&self.adaptive)
            .filter(|(_, &on)| on)
            .map(|(child, _)| child)
    }

    pub fn number_of_parameters(&self) -> usize {
        self.active().map(|child| child.number_of_parameters()).sum()
    }

    /// Append the parameters of every adaptive child, in child order
    pub fn append_parameters(&self, out: &mut Vec<f64>) {
        for child in self.active() {
            out.extend(child.parameter_vector());
        }
    }

    /// Split `parameters` into per-child slices
    fn split<'a>(&self, parameters: &'a [f64]) -> Result<Vec<(&C, &'a [f64])>> {
        let sizes: Vec<usize> = self
            .active()
            .map(|child| child.number_of_parameters())
            .collect();
        let expected: usize = sizes.iter().sum();
        if parameters.len() != expected {
            return Err(KernelError::DimensionMismatch {
                expected,
                actual: parameters.len(),
            });
        }

        let mut offset = 0;
        Ok(self
            .active()
            .zip(sizes)
            .map(|(child, size)| {
                let slice = &parameters[offset..offset + size];
                offset += size;
                (child, slice)
            })
            .collect())
    }

    pub fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        for (child, slice) in self.split(parameters)? {
            child.check_parameter_vector(slice)?;
        }
        Ok(())
    }

    /// Validate every child slice, then write them
    pub fn set_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        let parts = self.split(parameters)?;
        for (child, slice) in &parts {
            child.check_parameter_vector(slice)?;
        }
        for (child, slice) in parts {
            child.set_parameter_vector(slice)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_counts() {
        let slots = ParameterSlots::new(vec![0, 1, 2], true);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots.total_size(), 3);
        assert_eq!(slots.active_count(), 3);
        assert!(ParameterSlots::default().is_empty());
    }

    #[test]
    fn test_zero_size_slot_contributes_nothing() {
        let mut slots = ParameterSlots::new(vec![0, 1], false);
        slots.set_adaptive(0, true).unwrap();
        assert!(slots.is_adaptive(0));
        assert_eq!(slots.active_count(), 0);
        assert!(slots.gather(&[0.5]).is_empty());
    }

    #[test]
    fn test_gather_skips_frozen_slots() {
        let mut slots = ParameterSlots::new(vec![1, 2, 1], true);
        slots.set_adaptive(1, false).unwrap();

        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(slots.gather(&values), vec![1.0, 4.0]);
    }

    #[test]
    fn test_apply_keeps_frozen_values() {
        let mut slots = ParameterSlots::new(vec![1, 2, 1], true);
        slots.set_adaptive(1, false).unwrap();

        let values = [1.0, 2.0, 3.0, 4.0];
        let next = slots.apply(&values, &[10.0, 40.0]).unwrap();
        assert_eq!(next, vec![10.0, 2.0, 3.0, 40.0]);
    }

    #[test]
    fn test_apply_length_mismatch() {
        let slots = ParameterSlots::new(vec![1], true);
        match slots.apply(&[1.0], &[]) {
            Err(KernelError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 0);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut slots = ParameterSlots::new(vec![1], true);
        assert!(!slots.is_adaptive(3));
        assert!(matches!(
            slots.set_adaptive(3, true),
            Err(KernelError::SlotOutOfRange { slot: 3, slots: 1 })
        ));
    }

    #[test]
    fn test_set_all() {
        let mut slots = ParameterSlots::new(vec![1, 1], false);
        assert_eq!(slots.active_count(), 0);
        slots.set_all(true);
        assert_eq!(slots.active_count(), 2);
    }
}
