//! Kernel trait definitions and shared kernel handles

use crate::core::Result;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Flat parameter interface shared by every kernel, leaf or composite
///
/// Parameters are grouped into *slots*. Each slot can be switched in or out
/// of the exposed parameter vector; switched-off slots keep their last value
/// and reappear at the same position when switched back on. This is the
/// whole surface an optimizer needs to treat a kernel as a black box.
pub trait Parameterized: Send + Sync {
    /// Number of parameter slots
    fn number_of_slots(&self) -> usize;

    /// Whether `slot` is part of the parameter vector (`false` if out of range)
    fn is_adaptive(&self, slot: usize) -> bool;

    /// Switch a slot in or out of the parameter vector
    fn set_adaptive(&mut self, slot: usize, adaptive: bool) -> Result<()>;

    /// Switch every slot, recursing into child kernels
    fn set_adaptive_all(&mut self, adaptive: bool);

    /// Number of currently adaptive real parameters
    fn number_of_parameters(&self) -> usize;

    /// Adaptive parameters in stable slot order
    fn parameter_vector(&self) -> Vec<f64>;

    /// Validate a parameter vector without applying it
    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()>;

    /// Overwrite the adaptive parameters
    ///
    /// Fails with `DimensionMismatch` if the length differs from
    /// `number_of_parameters()`. Either the whole vector is applied or
    /// nothing changes.
    fn set_parameter_vector(&mut self, parameters: &[f64]) -> Result<()>;
}

/// Kernel function K(x, y) over inputs of type `I`
///
/// Evaluation is symmetric and side-effect free; it only reads parameters.
pub trait KernelFunction<I: ?Sized>: Parameterized {
    /// Compute kernel value K(x, y)
    fn eval(&self, x: &I, y: &I) -> Result<f64>;

    /// Short kernel name for logs and reports
    fn name(&self) -> &str;
}

/// Type-erased kernel handle that several composites may hold at once
///
/// Mutating a shared kernel through one holder is visible to every other
/// holder. Callers must not mutate while another thread evaluates.
pub type SharedKernel<I> = Arc<RwLock<dyn KernelFunction<I>>>;

/// Wrap a kernel into a shared, typed handle
pub fn shared<K>(kernel: K) -> Arc<RwLock<K>> {
    Arc::new(RwLock::new(kernel))
}

/// Erase the concrete type of a shared handle
///
/// The returned handle points at the same kernel, so the typed handle keeps
/// working (e.g. to read a scale factor after training).
pub fn to_dyn<I, K>(kernel: &Arc<RwLock<K>>) -> SharedKernel<I>
where
    I: ?Sized,
    K: KernelFunction<I> + 'static,
{
    kernel.clone()
}

/// Read access to a kernel behind a lock
///
/// Kernels only hold plain numbers, so a poisoned lock still holds usable
/// state and is recovered.
pub fn read_kernel<K: ?Sized>(kernel: &RwLock<K>) -> RwLockReadGuard<'_, K> {
    kernel.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write access to a kernel behind a lock
pub fn write_kernel<K: ?Sized>(kernel: &RwLock<K>) -> RwLockWriteGuard<'_, K> {
    kernel.write().unwrap_or_else(PoisonError::into_inner)
}
