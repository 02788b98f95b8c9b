//! Data loading and dataset implementations
//!
//! Kernel statistics only need the feature vectors, so loaders keep the
//! features and drop any labels. Everything can be turned into a
//! [`DenseDataset`], the input type of the dense composite kernels.

pub mod csv;
pub mod libsvm;

pub use self::csv::*;
pub use self::libsvm::*;

use crate::core::{Dataset, KernelError, Result};

/// Row-major collection of equal-length dense feature vectors
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DenseDataset {
    rows: Vec<Vec<f64>>,
    dim: usize,
}

impl DenseDataset {
    /// Build a dataset from rows that all have the same length
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let dim = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != dim) {
            return Err(KernelError::DimensionMismatch {
                expected: dim,
                actual: row.len(),
            });
        }
        Ok(Self { rows, dim })
    }

    /// Build a dataset, zero-padding short rows to the longest one
    pub fn from_padded(mut rows: Vec<Vec<f64>>) -> Self {
        let dim = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(dim, 0.0);
        }
        Self { rows, dim }
    }

    /// Feature dimension of every row
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.rows.get(i).map(Vec::as_slice)
    }
}

impl Dataset for DenseDataset {
    type Element = [f64];

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn element(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }
}
