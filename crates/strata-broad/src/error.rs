//! Coordinator error types.

use std::error::Error as StdError;
use std::fmt;

use smallvec::SmallVec;
use strata_index::ObjectId;
use thiserror::Error;

use crate::{Layer, LayerMask};

/// One layer index rejecting an operation.
#[derive(Debug)]
pub struct LayerFailure<E> {
    pub layer: Layer,
    pub error: E,
}

/// Every layer that failed during one fan-out, in layer order.
///
/// `source()` is the first failure.
#[derive(Debug)]
pub struct LayerFailures<E>(SmallVec<[LayerFailure<E>; 2]>);

impl<E> LayerFailures<E> {
    /// Check if no layer failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failure of the lowest failing layer.
    #[must_use]
    pub fn first(&self) -> Option<&LayerFailure<E>> {
        self.0.first()
    }

    /// Mask of the failed layers.
    #[must_use]
    pub fn layers(&self) -> LayerMask {
        self.0.iter().map(|failure| failure.layer).collect()
    }

    /// Failures in layer order.
    pub fn iter(&self) -> impl Iterator<Item = &LayerFailure<E>> {
        self.0.iter()
    }
}

impl<E> FromIterator<LayerFailure<E>> for LayerFailures<E> {
    fn from_iter<T: IntoIterator<Item = LayerFailure<E>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<E> IntoIterator for LayerFailures<E> {
    type Item = LayerFailure<E>;
    type IntoIter = smallvec::IntoIter<[LayerFailure<E>; 2]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a LayerFailures<E> {
    type Item = &'a LayerFailure<E>;
    type IntoIter = std::slice::Iter<'a, LayerFailure<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<E: fmt::Display> fmt::Display for LayerFailures<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} layer(s) failed", self.0.len())?;
        for (i, failure) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{}: {}", failure.layer, failure.error)?;
        }
        Ok(())
    }
}

impl<E: StdError + 'static> StdError for LayerFailures<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0
            .first()
            .map(|failure| &failure.error as &(dyn StdError + 'static))
    }
}

/// Coordinator operation error, generic over the layer index error.
#[derive(Debug, Error)]
pub enum CoordinatorError<E>
where
    E: StdError + 'static,
{
    /// Insert of an object that is already tracked.
    #[error("object {0} is already tracked")]
    DuplicateObject(ObjectId),

    /// Remove or update of an object that is not tracked.
    #[error("object {0} is not tracked")]
    UnknownObject(ObjectId),

    /// At least one selected layer rejected the insert. Layers that accepted
    /// it were rolled back.
    #[error("insert of object {id} failed on layers {}", .failures.layers())]
    LayerInsertFailed {
        id: ObjectId,
        #[source]
        failures: LayerFailures<E>,
    },

    /// At least one selected layer failed to drop the object. The object is
    /// no longer tracked; the failing layers may still hold it.
    #[error("remove of object {id} failed on layers {}", .failures.layers())]
    LayerRemoveFailed {
        id: ObjectId,
        #[source]
        failures: LayerFailures<E>,
    },

    /// At least one selected layer rejected the new bounds.
    #[error("update of object {id} failed on layers {}", .failures.layers())]
    LayerUpdateFailed {
        id: ObjectId,
        #[source]
        failures: LayerFailures<E>,
    },
}

impl<E: StdError + 'static> CoordinatorError<E> {
    /// Per-layer failures, if this is a layer error.
    #[must_use]
    pub fn failures(&self) -> Option<&LayerFailures<E>> {
        match self {
            Self::DuplicateObject(_) | Self::UnknownObject(_) => None,
            Self::LayerInsertFailed { failures, .. }
            | Self::LayerRemoveFailed { failures, .. }
            | Self::LayerUpdateFailed { failures, .. } => Some(failures),
        }
    }
}

/// Coordinator construction error.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Dedicated worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Membership table could not reserve the configured capacity.
    #[error("membership table cannot hold {0} objects")]
    TableCapacity(usize),
}

/// Result type for coordinator operations.
pub type CoordinatorResult<T, E> = Result<T, CoordinatorError<E>>;
