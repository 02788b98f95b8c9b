//! Error types for kernel composition and training

use crate::core::FieldKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid range {start}..{end} for input dimension {dim}")]
    InvalidRange {
        start: usize,
        end: usize,
        dim: usize,
    },

    #[error("Field '{field}' has kind {actual:?}, expected {expected:?}")]
    FieldTypeMismatch {
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("Index {index} out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Degenerate kernel: feature-space variance {variance} is not positive")]
    DegenerateKernel { variance: f64 },

    #[error("Slot {slot} out of range, kernel has {slots} slots")]
    SlotOutOfRange { slot: usize, slots: usize },

    #[error("Composite kernel needs at least one child kernel")]
    EmptyComposite,

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, KernelError>;
