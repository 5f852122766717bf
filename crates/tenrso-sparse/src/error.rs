//! Unified error types for sparse tensor storage
//!
//! # Design
//!
//! - **`SparseError`**: Top-level enum covering all error cases
//! - **`ValidationError`**: shape, length and mode-order checks
//! - **`IndexError`**: coordinates outside the tensor extents
//! - **`ParseError`**: malformed coordinate files
//!
//! # Examples
//!
//! ```
//! use tenrso_sparse::error::{SparseError, ValidationError};
//!
//! fn validate_shape(shape: &[usize]) -> Result<(), SparseError> {
//!     if shape.is_empty() {
//!         return Err(SparseError::Validation(ValidationError::EmptyShape));
//!     }
//!     if shape.contains(&0) {
//!         return Err(SparseError::Validation(ValidationError::ZeroInShape));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Top-level error type for all sparse tensor operations
#[derive(Error, Debug)]
pub enum SparseError {
    /// Validation errors (shape, indices, values)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Index errors
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Coordinate file parse errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Underlying reader/writer failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors for tensor properties
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Shape cannot be empty")]
    EmptyShape,

    #[error("Shape cannot contain zeros")]
    ZeroInShape,

    #[error("Mode count mismatch: expected {expected}, got {got}")]
    ModeCount { expected: usize, got: usize },

    #[error("Mode {mode} has {got} indices but {expected} values")]
    LengthMismatch {
        mode: usize,
        expected: usize,
        got: usize,
    },

    #[error("Invalid mode order: {reason}")]
    InvalidModeOrder { reason: String },

    #[error("Mode {mode} out of range for a {nmodes}-mode tensor")]
    InvalidMode { mode: usize, nmodes: usize },
}

/// Index errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Index out of bounds: mode {mode} index {index} exceeds extent {extent}")]
    OutOfBounds {
        mode: usize,
        index: usize,
        extent: usize,
    },

    #[error("Index 0 on line {line}: coordinate files are 1-based")]
    ZeroBased { line: usize },
}

/// Coordinate file parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: expected {expected} fields, got {got}")]
    FieldCount {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("no non-zeros found")]
    Empty,
}

/// Result type alias for sparse tensor operations
pub type SparseResult<T> = Result<T, SparseError>;

impl SparseError {
    /// Create an index out of bounds error
    pub fn index_out_of_bounds(mode: usize, index: usize, extent: usize) -> Self {
        SparseError::Index(IndexError::OutOfBounds {
            mode,
            index,
            extent,
        })
    }

    /// Create a malformed-line parse error
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        SparseError::Parse(ParseError::Malformed {
            line,
            reason: reason.into(),
        })
    }
}
