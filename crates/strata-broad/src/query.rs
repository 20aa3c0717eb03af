//! Read-only broad-phase view.

use rustc_hash::FxHashSet;
use strata_index::ObjectId;

use crate::LayerMask;

/// Query side of a layered broad phase.
///
/// Systems that only look for overlap candidates (collision passes,
/// visibility, triggers) take `&impl BroadPhaseQuery` so they cannot mutate
/// membership.
pub trait BroadPhaseQuery {
    /// Query box type.
    type Bounds;

    /// Objects in any layer of `mask` whose bounds intersect `query`, each
    /// reported once.
    fn broad_phase(&self, mask: LayerMask, query: &Self::Bounds) -> FxHashSet<ObjectId>;
}
