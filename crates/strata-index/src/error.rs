//! Index error types.

use thiserror::Error;

use crate::ObjectId;

/// Errors reported by a single layer index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// The object is already stored in this layer.
    #[error("object {0} is already indexed")]
    DuplicateId(ObjectId),

    /// The object is not stored in this layer.
    #[error("object {0} is not indexed")]
    UnknownId(ObjectId),

    /// Box corners are not finite or not ordered.
    #[error("invalid bounds: min {min:?} max {max:?}")]
    InvalidBounds { min: [f64; 2], max: [f64; 2] },

    /// Index configuration rejected.
    #[error("invalid index config: {0}")]
    InvalidConfig(String),
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
