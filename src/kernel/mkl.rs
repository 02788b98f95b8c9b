//! Multiple kernel learning over heterogeneous records
//!
//! A record is a fixed sequence of typed fields (dense vector, sparse
//! vector, discrete state, scalar or a nested record). Each field gets its
//! own kernel and the results are multiplied:
//!
//! K(x, y) = Π_i K_i(x.field_i, y.field_i)

use crate::core::{FieldKind, FieldRef, FieldSpec, Fields, KernelError, Record, Result, SparseVector};
use crate::kernel::params::{ChildSet, KernelNode};
use crate::kernel::traits::read_kernel;
use crate::kernel::{to_dyn, KernelFunction, Parameterized, SharedKernel};
use log::debug;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

/// Kernel bound to one record field, tagged with the kind it accepts
#[derive(Clone)]
pub enum FieldKernel {
    Dense(SharedKernel<[f64]>),
    Sparse(SharedKernel<SparseVector>),
    Discrete(SharedKernel<usize>),
    Scalar(SharedKernel<f64>),
    Record(SharedKernel<Record>),
}

impl FieldKernel {
    pub fn dense<K: KernelFunction<[f64]> + 'static>(kernel: &Arc<RwLock<K>>) -> Self {
        FieldKernel::Dense(to_dyn(kernel))
    }

    pub fn sparse<K: KernelFunction<SparseVector> + 'static>(kernel: &Arc<RwLock<K>>) -> Self {
        FieldKernel::Sparse(to_dyn(kernel))
    }

    pub fn discrete<K: KernelFunction<usize> + 'static>(kernel: &Arc<RwLock<K>>) -> Self {
        FieldKernel::Discrete(to_dyn(kernel))
    }

    pub fn scalar<K: KernelFunction<f64> + 'static>(kernel: &Arc<RwLock<K>>) -> Self {
        FieldKernel::Scalar(to_dyn(kernel))
    }

    /// Bind a kernel over nested records, e.g. another [`MklKernel`]
    pub fn record<K: KernelFunction<Record> + 'static>(kernel: &Arc<RwLock<K>>) -> Self {
        FieldKernel::Record(to_dyn(kernel))
    }

    /// Field kind this kernel accepts
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldKernel::Dense(_) => FieldKind::Dense,
            FieldKernel::Sparse(_) => FieldKind::Sparse,
            FieldKernel::Discrete(_) => FieldKind::Discrete,
            FieldKernel::Scalar(_) => FieldKind::Scalar,
            FieldKernel::Record(_) => FieldKind::Record,
        }
    }

    /// Name of the wrapped kernel
    pub fn kernel_name(&self) -> String {
        match self {
            FieldKernel::Dense(k) => read_kernel(k).name().to_string(),
            FieldKernel::Sparse(k) => read_kernel(k).name().to_string(),
            FieldKernel::Discrete(k) => read_kernel(k).name().to_string(),
            FieldKernel::Scalar(k) => read_kernel(k).name().to_string(),
            FieldKernel::Record(k) => read_kernel(k).name().to_string(),
        }
    }

    fn node(&self) -> &dyn KernelNode {
        match self {
            FieldKernel::Dense(k) => k,
            FieldKernel::Sparse(k) => k,
            FieldKernel::Discrete(k) => k,
            FieldKernel::Scalar(k) => k,
            FieldKernel::Record(k) => k,
        }
    }

    fn eval(&self, field: &str, x: FieldRef<'_>, y: FieldRef<'_>) -> Result<f64> {
        match (self, x, y) {
            (FieldKernel::Dense(k), FieldRef::Dense(a), FieldRef::Dense(b)) => {
                read_kernel(k).eval(a, b)
            }
            (FieldKernel::Sparse(k), FieldRef::Sparse(a), FieldRef::Sparse(b)) => {
                read_kernel(k).eval(a, b)
            }
            (FieldKernel::Discrete(k), FieldRef::Discrete(a), FieldRef::Discrete(b)) => {
                read_kernel(k).eval(&a, &b)
            }
            (FieldKernel::Scalar(k), FieldRef::Scalar(a), FieldRef::Scalar(b)) => {
                read_kernel(k).eval(&a, &b)
            }
            (FieldKernel::Record(k), FieldRef::Record(a), FieldRef::Record(b)) => {
                read_kernel(k).eval(a, b)
            }
            _ => {
                let expected = self.kind();
                let actual = if x.kind() != expected { x.kind() } else { y.kind() };
                Err(KernelError::FieldTypeMismatch {
                    field: field.to_string(),
                    expected,
                    actual,
                })
            }
        }
    }
}

impl KernelNode for FieldKernel {
    fn number_of_parameters(&self) -> usize {
        self.node().number_of_parameters()
    }

    fn parameter_vector(&self) -> Vec<f64> {
        self.node().parameter_vector()
    }

    fn check_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        self.node().check_parameter_vector(parameters)
    }

    fn set_parameter_vector(&self, parameters: &[f64]) -> Result<()> {
        self.node().set_parameter_vector(parameters)
    }

    fn set_adaptive_all(&self, adaptive: bool) {
        self.node().set_adaptive_all(adaptive)
    }
}

/// Resolved binding of a child kernel to a record field
#[derive(Debug, Clone)]
struct Route {
    index: usize,
    name: String,
}

/// Product of per-field kernels over records of type `R`
///
/// The schema declares the record layout once; routing from child kernel to
/// field index is resolved and type-checked at construction. Records are
/// only checked again at evaluation time, where a field of the wrong kind
/// is reported as `FieldTypeMismatch` and a missing field as
/// `DimensionMismatch`.
///
/// There is one slot per bound field, non-adaptive at first.
pub struct MklKernel<R: ?Sized = Record> {
    schema: Vec<FieldSpec>,
    routes: Vec<Route>,
    children: ChildSet<FieldKernel>,
    _record: PhantomData<fn(&R)>,
}

impl<R: Fields + ?Sized> MklKernel<R> {
    /// Bind one kernel to every schema field, in schema order
    ///
    /// # Errors
    /// * `DimensionMismatch` if there is not exactly one kernel per field
    /// * `EmptyComposite` if the schema is empty
    /// * `FieldTypeMismatch` if a kernel does not accept its field's kind
    pub fn new(schema: Vec<FieldSpec>, kernels: Vec<FieldKernel>) -> Result<Self> {
        if kernels.len() != schema.len() {
            return Err(KernelError::DimensionMismatch {
                expected: schema.len(),
                actual: kernels.len(),
            });
        }
        Self::build(schema, kernels.into_iter().enumerate().collect())
    }

    /// Bind kernels to fields by name
    ///
    /// Fields may be left out, listed in any order or bound more than once.
    ///
    /// # Errors
    /// * `InvalidParameter` if a name is not in the schema
    /// * `EmptyComposite` if no binding is given
    /// * `FieldTypeMismatch` if a kernel does not accept its field's kind
    pub fn with_bindings(schema: Vec<FieldSpec>, bindings: Vec<(&str, FieldKernel)>) -> Result<Self> {
        let mut resolved = Vec::with_capacity(bindings.len());
        for (name, kernel) in bindings {
            let index = schema
                .iter()
                .position(|spec| spec.name == name)
                .ok_or_else(|| KernelError::InvalidParameter(format!("Unknown field '{name}'")))?;
            resolved.push((index, kernel));
        }
        Self::build(schema, resolved)
    }

    fn build(schema: Vec<FieldSpec>, bindings: Vec<(usize, FieldKernel)>) -> Result<Self> {
        if bindings.is_empty() {
            return Err(KernelError::EmptyComposite);
        }

        let mut routes = Vec::with_capacity(bindings.len());
        let mut kernels = Vec::with_capacity(bindings.len());
        for (index, kernel) in bindings {
            let spec = &schema[index];
            if kernel.kind() != spec.kind {
                return Err(KernelError::FieldTypeMismatch {
                    field: spec.name.clone(),
                    expected: spec.kind,
                    actual: kernel.kind(),
                });
            }
            debug!("MKL field '{}' -> {} kernel", spec.name, kernel.kernel_name());
            routes.push(Route {
                index,
                name: spec.name.clone(),
            });
            kernels.push(kernel);
        }

        Ok(Self {
            schema,
            routes,
            children: ChildSet::new(kernels),
            _record: PhantomData,
        })
    }

    /// Check that a record matches the schema
    pub fn check_record(&self, record: &R) -> Result<()> {
        if record.field_count() != self.schema.len() {
            return Err(KernelError::DimensionMismatch {
                expected: self.schema.len(),
                actual: record.field_count(),
            });
        }
        for (index, spec) in self.schema.iter().enumerate() {
            let field = self.field(record, index)?;
            if field.kind() != spec.kind {
                return Err(KernelError::FieldTypeMismatch {
                    field: spec.name.clone(),
                    expected: spec.kind,
                    actual: field.kind(),
                });
            }
        }
        Ok(())
    }

    fn field<'a>(&self, record: &'a R, index: usize) -> Result<FieldRef<'a>> {
        record.field(index).ok_or(KernelError::DimensionMismatch {
            expected: self.schema.len(),
            actual: record.field_count(),
        })
    }
}

impl<R: ?Sized> MklKernel<R> {
    pub fn schema(&self) -> &[FieldSpec] {
        &self.schema
    }

    /// Number of bound field kernels
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Field index read by child `index`
    pub fn field_index(&self, index: usize) -> Option<usize> {
        self.routes.get(index).map(|route| route.index)
    }

    pub fn kernels(&self) -> impl Iterator<Item = &FieldKernel> {
        self.children.iter()
    }
}

impl<R: ?Sized> Parameterized for MklKernel<R> {
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

impl<R: Fields + ?Sized> KernelFunction<R> for MklKernel<R> {
    fn eval(&self, x: &R, y: &R) -> Result<f64> {
        let mut result = 1.0;
        for (route, kernel) in self.routes.iter().zip(self.children.iter()) {
            let a = self.field(x, route.index)?;
            let b = self.field(y, route.index)?;
            result *= kernel.eval(&route.name, a, b)?;
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "mkl"
    }
}
