//! The single-layer index capability.

use crate::ObjectId;

/// A spatial index over one layer, keyed by [`ObjectId`].
///
/// The coordinator builds sixteen instances from the same `Config` and only
/// ever touches one instance per task, so implementations need no internal
/// synchronization beyond being `Send + Sync`.
pub trait LayerIndex: Send + Sync + Sized {
    /// Box value stored per object. The coordinator passes it through
    /// untouched.
    type Bounds: Send + Sync;

    /// Construction parameters, shared by every layer.
    type Config;

    /// Per-layer failure.
    type Error: std::error::Error + Send + 'static;

    /// Build an empty index.
    fn new(config: &Self::Config) -> Self;

    /// Store `bounds` for `id`.
    fn insert(&mut self, id: ObjectId, bounds: &Self::Bounds) -> Result<(), Self::Error>;

    /// Drop `id` from the index.
    fn remove(&mut self, id: ObjectId) -> Result<(), Self::Error>;

    /// Replace the stored bounds of `id`.
    fn update(&mut self, id: ObjectId, bounds: &Self::Bounds) -> Result<(), Self::Error>;

    /// All objects whose stored bounds intersect `bounds`.
    ///
    /// The result may contain duplicates. An error means this layer could
    /// not answer; callers decide whether that is fatal.
    fn query(&self, bounds: &Self::Bounds) -> Result<Vec<ObjectId>, Self::Error>;
}
