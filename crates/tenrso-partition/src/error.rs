//! Error types for partition indexing, statistics and redistribution
//!
//! Every failure maps onto one [`ErrorKind`]. Library code only returns errors;
//! deciding whether a failure terminates the process is left to the binary.
//!
//! # Examples
//!
//! ```
//! use tenrso_partition::error::{ErrorKind, PartitionError};
//!
//! let err = PartitionError::LabelOutOfRange { vertex: 3, label: 9, nparts: 4 };
//! assert_eq!(err.kind(), ErrorKind::ContractViolation);
//! ```

use tenrso_sparse::SparseError;
use thiserror::Error;

use crate::comm::CommError;

/// Failure classes shared by all partition operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required external input is absent
    Usage,
    /// The requested analysis is not implemented
    Unsupported,
    /// An input broke a documented precondition
    ContractViolation,
    /// A collective exchange did not complete
    CommunicationFailure,
    /// Reading or parsing an input file failed
    Io,
}

/// Top-level error type for partition operations
#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("usage: {reason}")]
    Usage { reason: String },

    #[error("analysis type '{kind}' not implemented")]
    Unsupported { kind: String },

    #[error("label {label} of vertex {vertex} out of range [0, {nparts})")]
    LabelOutOfRange {
        vertex: usize,
        label: usize,
        nparts: usize,
    },

    #[error("target rank {target} of non-zero {index} out of range [0, {size})")]
    TargetOutOfRange {
        index: usize,
        target: usize,
        size: usize,
    },

    #[error("expected {expected} labels, found {got}")]
    LabelCount { expected: usize, got: usize },

    #[error("partition file line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Sparse(#[from] SparseError),

    #[error("communication failure: {0}")]
    Communication(#[from] CommError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for partition operations
pub type PartitionResult<T> = Result<T, PartitionError>;

impl PartitionError {
    /// The failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PartitionError::Usage { .. } => ErrorKind::Usage,
            PartitionError::Unsupported { .. } => ErrorKind::Unsupported,
            PartitionError::LabelOutOfRange { .. }
            | PartitionError::TargetOutOfRange { .. }
            | PartitionError::LabelCount { .. }
            | PartitionError::InvalidInput(_) => ErrorKind::ContractViolation,
            PartitionError::Sparse(SparseError::Io(_) | SparseError::Parse(_)) => ErrorKind::Io,
            PartitionError::Sparse(_) => ErrorKind::ContractViolation,
            PartitionError::Communication(_) => ErrorKind::CommunicationFailure,
            PartitionError::Parse { .. } | PartitionError::Io(_) => ErrorKind::Io,
        }
    }

    /// Create a usage error with a message
    pub fn usage(reason: impl Into<String>) -> Self {
        PartitionError::Usage {
            reason: reason.into(),
        }
    }

    /// Create an invalid-input error with a message
    pub fn invalid(msg: impl Into<String>) -> Self {
        PartitionError::InvalidInput(msg.into())
    }
}
