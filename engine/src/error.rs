//! Error types for the ordering engine.

use crate::SortIndex;
use thiserror::Error;

/// All possible errors from the ordering engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("invalid sort index target {index}: {reason}")]
    InvalidIndexTarget { index: SortIndex, reason: String },

    #[error("records {first} and {second} belong to different groups")]
    CrossGroupOperation { first: String, second: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // Store errors
    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("record already exists: {0}")]
    RecordAlreadyExists(String),

    #[error("record store failure: {0}")]
    StoreFailure(String),

    // State errors
    #[error("contiguity violated in group {group}: expected index {expected}, found {found}")]
    ContiguityViolation {
        group: String,
        expected: SortIndex,
        found: SortIndex,
    },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl Error {
    pub(crate) fn negative_index(index: SortIndex) -> Self {
        Error::InvalidIndexTarget {
            index,
            reason: "sort index must not be negative".into(),
        }
    }

    pub(crate) fn out_of_range(index: SortIndex, first: SortIndex, last: SortIndex) -> Self {
        Error::InvalidIndexTarget {
            index,
            reason: format!("outside the group range {first}..={last}"),
        }
    }

    pub(crate) fn index_overflow(index: SortIndex) -> Self {
        Error::InvalidIndexTarget {
            index,
            reason: "no sort index follows it".into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
