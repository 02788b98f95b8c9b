//! CSV format dataset implementation
//!
//! Supports loading datasets from CSV files where:
//! - Every column is a feature
//! - First row can be headers (automatically detected)
//! - Lines starting with '#' are comments

use crate::core::{Dataset, KernelError, Result};
use crate::data::DenseDataset;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dense feature rows loaded from a CSV file
#[derive(Debug, Clone)]
pub struct CSVDataset {
    data: DenseDataset,
    header: Option<Vec<String>>,
}

impl CSVDataset {
    /// Load a dataset from a CSV file, detecting a header row
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load a dataset from a reader, detecting a header row
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load a dataset from a reader with explicit header option
    pub fn from_reader_with_options<R: BufRead>(reader: R, auto_detect_header: bool) -> Result<Self> {
        let mut rows = Vec::new();
        let mut header = None;
        let mut first = true;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first {
                first = false;
                if auto_detect_header && Self::is_header_line(line) {
                    header = Some(line.split(',').map(|f| f.trim().to_string()).collect());
                    continue;
                }
            }

            let row = Self::parse_data_line(line).map_err(|e| {
                KernelError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(KernelError::EmptyDataset);
        }

        Ok(CSVDataset {
            data: DenseDataset::new(rows)?,
            header,
        })
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();

        // Most fields non-numeric means header
        let non_numeric_count = fields
            .iter()
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count * 2 > fields.len()
    }

    /// Parse a CSV data line into a feature row
    fn parse_data_line(line: &str) -> Result<Vec<f64>> {
        line.split(',')
            .map(str::trim)
            .enumerate()
            .map(|(idx, field)| {
                field.parse::<f64>().map_err(|_| {
                    KernelError::ParseError(format!(
                        "Invalid feature value at column {}: {}",
                        idx + 1,
                        field
                    ))
                })
            })
            .collect()
    }

    /// Column names, if the file had a header row
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn dim(&self) -> usize {
        self.data.dim()
    }

    pub fn into_dense(self) -> DenseDataset {
        self.data
    }
}

impl Dataset for CSVDataset {
    type Element = [f64];

    fn len(&self) -> usize {
        self.data.len()
    }

    fn element(&self, i: usize) -> &[f64] {
        self.data.element(i)
    }
}
