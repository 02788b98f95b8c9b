//! Core input types for kernel evaluation

/// Sparse vector representation with sorted indices
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<usize>,
    /// Values corresponding to indices
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a new sparse vector, ensuring indices are sorted
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Create an empty sparse vector
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a sparse vector from a dense slice, dropping exact zeros
    pub fn from_dense(dense: &[f64]) -> Self {
        let (indices, values) = dense
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0.0)
            .map(|(i, &v)| (i, v))
            .unzip();
        Self { indices, values }
    }

    /// Get the value at a specific index (0 if not present)
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Compute squared L2 norm
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Check if vector is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Dot product with another sparse vector
    ///
    /// Both index lists are sorted, so this is a merge in
    /// O(nnz(x) + nnz(y)) time.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let mut result = 0.0;
        let mut i = 0;
        let mut j = 0;

        while i < self.indices.len() && j < other.indices.len() {
            let x_idx = self.indices[i];
            let y_idx = other.indices[j];

            if x_idx == y_idx {
                result += self.values[i] * other.values[j];
                i += 1;
                j += 1;
            } else if x_idx < y_idx {
                i += 1;
            } else {
                j += 1;
            }
        }

        result
    }

    /// Squared Euclidean distance to another sparse vector
    ///
    /// Indices present in only one of the vectors contribute the square of
    /// that value, shared indices contribute the squared difference.
    pub fn squared_distance(&self, other: &SparseVector) -> f64 {
        let mut distance_sq = 0.0;
        let mut i = 0;
        let mut j = 0;

        while i < self.indices.len() && j < other.indices.len() {
            let x_idx = self.indices[i];
            let y_idx = other.indices[j];

            if x_idx == y_idx {
                let diff = self.values[i] - other.values[j];
                distance_sq += diff * diff;
                i += 1;
                j += 1;
            } else if x_idx < y_idx {
                distance_sq += self.values[i] * self.values[i];
                i += 1;
            } else {
                distance_sq += other.values[j] * other.values[j];
                j += 1;
            }
        }

        distance_sq += self.values[i..].iter().map(|v| v * v).sum::<f64>();
        distance_sq += other.values[j..].iter().map(|v| v * v).sum::<f64>();

        distance_sq
    }
}

/// The closed set of value kinds a heterogeneous record field may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Dense real vector
    Dense,
    /// Sparse real vector
    Sparse,
    /// Small nonnegative integer (category id)
    Discrete,
    /// Single real number
    Scalar,
    /// Nested heterogeneous record
    Record,
}

/// Owned value of one record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Dense(Vec<f64>),
    Sparse(SparseVector),
    Discrete(usize),
    Scalar(f64),
    Record(Record),
}

impl FieldValue {
    /// Kind tag of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Dense(_) => FieldKind::Dense,
            FieldValue::Sparse(_) => FieldKind::Sparse,
            FieldValue::Discrete(_) => FieldKind::Discrete,
            FieldValue::Scalar(_) => FieldKind::Scalar,
            FieldValue::Record(_) => FieldKind::Record,
        }
    }

    /// Borrowed view of this value
    pub fn view(&self) -> FieldRef<'_> {
        match self {
            FieldValue::Dense(v) => FieldRef::Dense(v),
            FieldValue::Sparse(v) => FieldRef::Sparse(v),
            FieldValue::Discrete(i) => FieldRef::Discrete(*i),
            FieldValue::Scalar(x) => FieldRef::Scalar(*x),
            FieldValue::Record(r) => FieldRef::Record(r),
        }
    }
}

/// Borrowed view of one record field, handed to field kernels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    Dense(&'a [f64]),
    Sparse(&'a SparseVector),
    Discrete(usize),
    Scalar(f64),
    Record(&'a Record),
}

impl FieldRef<'_> {
    /// Kind tag of the referenced value
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldRef::Dense(_) => FieldKind::Dense,
            FieldRef::Sparse(_) => FieldKind::Sparse,
            FieldRef::Discrete(_) => FieldKind::Discrete,
            FieldRef::Scalar(_) => FieldKind::Scalar,
            FieldRef::Record(_) => FieldKind::Record,
        }
    }
}

/// Named, typed field declaration of a heterogeneous input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Dynamic heterogeneous record: fields in declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub fields: Vec<FieldValue>,
}

impl Record {
    pub fn new(fields: Vec<FieldValue>) -> Self {
        Self { fields }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
