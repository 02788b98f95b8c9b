//! Core traits describing kernel inputs and sample collections

use crate::core::{FieldRef, KernelError, Record, Result, SparseVector};

/// Finite, indexable collection of input elements
pub trait Dataset {
    /// Element type handed to kernels
    type Element: ?Sized;

    /// Number of elements in the dataset
    fn len(&self) -> usize;

    /// Get a single element by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn element(&self, i: usize) -> &Self::Element;

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Dataset for [T] {
    type Element = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn element(&self, i: usize) -> &T {
        &self[i]
    }
}

impl<T> Dataset for Vec<T> {
    type Element = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, i: usize) -> &T {
        &self[i]
    }
}

/// Inputs living in an inner-product space
///
/// Vector kernels (RBF, linear, polynomial) are written once against this
/// trait and work for dense slices, sparse vectors and scalars alike.
pub trait InnerProduct {
    /// Inner product <x, y>
    fn dot(&self, other: &Self) -> Result<f64>;

    /// Squared Euclidean distance ||x - y||²
    fn squared_distance(&self, other: &Self) -> Result<f64>;
}

impl InnerProduct for [f64] {
    fn dot(&self, other: &Self) -> Result<f64> {
        check_same_len(self, other)?;
        Ok(self.iter().zip(other).map(|(x, y)| x * y).sum())
    }

    fn squared_distance(&self, other: &Self) -> Result<f64> {
        check_same_len(self, other)?;
        Ok(self
            .iter()
            .zip(other)
            .map(|(x, y)| (x - y) * (x - y))
            .sum())
    }
}

impl InnerProduct for SparseVector {
    fn dot(&self, other: &Self) -> Result<f64> {
        Ok(SparseVector::dot(self, other))
    }

    fn squared_distance(&self, other: &Self) -> Result<f64> {
        Ok(SparseVector::squared_distance(self, other))
    }
}

impl InnerProduct for f64 {
    fn dot(&self, other: &Self) -> Result<f64> {
        Ok(self * other)
    }

    fn squared_distance(&self, other: &Self) -> Result<f64> {
        Ok((self - other) * (self - other))
    }
}

fn check_same_len(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(KernelError::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    Ok(())
}

/// Heterogeneous inputs made of positional, typed fields
///
/// Implement this for your own record struct to feed it to an
/// [`MklKernel`](crate::kernel::MklKernel); field `i` must always have the
/// same kind.
pub trait Fields {
    /// Number of fields carried by this record
    fn field_count(&self) -> usize;

    /// Borrow field `index`, or `None` if the record has no such field
    fn field(&self, index: usize) -> Option<FieldRef<'_>>;
}

impl Fields for Record {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        self.fields.get(index).map(|value| value.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldValue;

    #[test]
    fn test_dense_inner_product() {
        let x = [1.0, 2.0, 3.0];
        let y = [4.0, 5.0, 6.0];

        assert_eq!(x[..].dot(&y[..]).unwrap(), 32.0);
        assert_eq!(x[..].squared_distance(&y[..]).unwrap(), 27.0);
    }

    #[test]
    fn test_dense_length_mismatch() {
        let x = [1.0, 2.0];
        let y = [1.0, 2.0, 3.0];

        match x[..].dot(&y[..]) {
            Err(KernelError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
        assert!(x[..].squared_distance(&y[..]).is_err());
    }

    #[test]
    fn test_scalar_inner_product() {
        assert_eq!(2.0_f64.dot(&3.0).unwrap(), 6.0);
        assert_eq!(2.0_f64.squared_distance(&-1.0).unwrap(), 9.0);
    }

    #[test]
    fn test_vec_dataset() {
        let data = vec![1usize, 2, 3];
        assert_eq!(Dataset::len(&data), 3);
        assert_eq!(*data.element(1), 2);
        assert!(!Dataset::is_empty(&data));
        assert!(Dataset::is_empty(&Vec::<usize>::new()));
    }

    #[test]
    fn test_record_fields() {
        let record = Record::new(vec![FieldValue::Dense(vec![1.0]), FieldValue::Discrete(4)]);
        assert_eq!(record.field(0), Some(FieldRef::Dense(&[1.0])));
        assert_eq!(record.field(1), Some(FieldRef::Discrete(4)));
        assert_eq!(record.field(2), None);
        assert_eq!(record.field_count(), 2);
    }
}
