//! LibSVM format dataset implementation
//!
//! Supports loading datasets in the libsvm format:
//! label index:value index:value ...
//!
//! Example:
//! +1 1:0.5 3:1.2 7:0.8
//! -1 2:0.3 5:2.1
//!
//! The leading label is validated and then dropped; only the feature
//! vectors are kept.

use crate::core::{Dataset, KernelError, Result, SparseVector};
use crate::data::DenseDataset;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Sparse feature vectors loaded from a LibSVM format file
#[derive(Debug, Clone)]
pub struct LibSVMDataset {
    vectors: Vec<SparseVector>,
    dimensions: usize,
}

impl LibSVMDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut vectors = Vec::new();
        let mut max_dimension = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match Self::parse_line(line) {
                Ok((features, dimension)) => {
                    vectors.push(features);
                    max_dimension = max_dimension.max(dimension);
                }
                Err(e) => {
                    return Err(KernelError::ParseError(format!(
                        "Error parsing line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }

        if vectors.is_empty() {
            return Err(KernelError::EmptyDataset);
        }

        Ok(LibSVMDataset {
            vectors,
            dimensions: max_dimension,
        })
    }

    /// Parse a single line; returns the features and the implied dimension
    fn parse_line(line: &str) -> Result<(SparseVector, usize)> {
        let mut parts = line.split_whitespace();

        let label = parts
            .next()
            .ok_or_else(|| KernelError::ParseError("Empty line".to_string()))?;
        label
            .parse::<f64>()
            .map_err(|_| KernelError::ParseError(format!("Invalid label: {label}")))?;

        let mut indices = Vec::new();
        let mut values = Vec::new();
        let mut dimension = 0;

        for feature_str in parts {
            let (index, value) = feature_str.split_once(':').ok_or_else(|| {
                KernelError::ParseError(format!("Invalid feature format: {feature_str}"))
            })?;

            let index = index.parse::<usize>().map_err(|_| {
                KernelError::ParseError(format!("Invalid feature index: {index}"))
            })?;

            let value = value.parse::<f64>().map_err(|_| {
                KernelError::ParseError(format!("Invalid feature value: {value}"))
            })?;

            // libsvm uses 1-based indexing, convert to 0-based
            if index == 0 {
                return Err(KernelError::ParseError(
                    "Feature index must be positive: 0".to_string(),
                ));
            }

            indices.push(index - 1);
            values.push(value);
            dimension = dimension.max(index);
        }

        Ok((SparseVector::new(indices, values), dimension))
    }

    /// Dimension implied by the largest feature index
    pub fn dim(&self) -> usize {
        self.dimensions
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    /// Expand every vector to a dense row of length `dim()`
    pub fn to_dense(&self) -> DenseDataset {
        let rows = self
            .vectors
            .iter()
            .map(|v| {
                let mut row = vec![0.0; self.dimensions];
                for (&i, &x) in v.indices.iter().zip(&v.values) {
                    row[i] = x;
                }
                row
            })
            .collect();
        DenseDataset::from_padded(rows)
    }
}

impl Dataset for LibSVMDataset {
    type Element = SparseVector;

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn element(&self, i: usize) -> &SparseVector {
        &self.vectors[i]
    }
}
