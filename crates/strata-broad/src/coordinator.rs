//! The layer coordinator.

use parking_lot::{RwLock, RwLockReadGuard};
use rustc_hash::FxHashSet;
use strata_index::{LayerIndex, ObjectId};
use tracing::{debug, trace, warn};

use crate::error::{BuildError, CoordinatorError, CoordinatorResult, LayerFailure, LayerFailures};
use crate::fanout::Executor;
use crate::{BroadPhaseQuery, CoordinatorConfig, LAYER_COUNT, Layer, LayerMask, MembershipTable};

/// Membership of objects across sixteen layer indexes.
///
/// Every mutating call looks up (or records) the object's mask, runs one
/// task per selected layer, joins them all, and only then reports. The
/// membership table lock is never held across that join.
///
/// Calls for distinct objects may run concurrently. Calls for the same object
/// must not overlap; the coordinator does no per-object locking.
///
/// Each index sits behind its own lock: tasks of one call never share a
/// layer, but two concurrent calls can both target it.
pub struct LayerCoordinator<I: LayerIndex> {
    table: MembershipTable,
    layers: [RwLock<I>; LAYER_COUNT],
    executor: Executor,
}

impl<I: LayerIndex> LayerCoordinator<I> {
    /// Build a coordinator; every layer index gets `config.index`.
    pub fn new(config: &CoordinatorConfig<I::Config>) -> Result<Self, BuildError> {
        let executor = Executor::new(config.worker_threads)?;
        let table = MembershipTable::try_with_capacity(config.table_capacity)
            .map_err(|_| BuildError::TableCapacity(config.table_capacity))?;
        Ok(Self::from_parts(&config.index, table, executor))
    }

    /// Build a coordinator on the global rayon pool with default capacity.
    #[must_use]
    pub fn with_index_config(index: &I::Config) -> Self {
        let table = MembershipTable::with_capacity(
            CoordinatorConfig::<I::Config>::DEFAULT_TABLE_CAPACITY,
        );
        Self::from_parts(index, table, Executor::Global)
    }

    fn from_parts(index: &I::Config, table: MembershipTable, executor: Executor) -> Self {
        debug!(
            table_capacity = table.capacity(),
            threads = executor.threads(),
            "building layer coordinator"
        );

        Self {
            table,
            layers: std::array::from_fn(|_| RwLock::new(I::new(index))),
            executor,
        }
    }

    /// Start tracking `id` in every layer of `mask`.
    ///
    /// An empty mask is legal: the object is tracked but never returned by a
    /// query. If any layer rejects the insert, the layers that accepted it
    /// are rolled back and `id` is left untracked.
    pub fn insert(
        &self,
        id: ObjectId,
        mask: LayerMask,
        bounds: &I::Bounds,
    ) -> CoordinatorResult<(), I::Error> {
        if !self.table.claim(id, mask) {
            return Err(CoordinatorError::DuplicateObject(id));
        }

        let failures = self.mutate(mask, |index| index.insert(id, bounds));
        if failures.is_empty() {
            trace!(%id, %mask, "inserted");
            return Ok(());
        }

        let accepted = mask - failures.layers();
        let residue = self.mutate(accepted, |index| index.remove(id));
        for failure in &residue {
            warn!(
                %id,
                layer = %failure.layer,
                error = %failure.error,
                "rollback of partial insert failed; layer keeps an orphan"
            );
        }
        self.table.release(id);

        warn!(%id, failed = %failures.layers(), rolled_back = %accepted, "insert failed");
        Err(CoordinatorError::LayerInsertFailed { id, failures })
    }

    /// Stop tracking `id` and drop it from its layers.
    ///
    /// The table entry is released once every layer has been asked, whether
    /// or not they all succeeded. Layers that failed are reported and may
    /// still hold the object.
    pub fn remove(&self, id: ObjectId) -> CoordinatorResult<(), I::Error> {
        let mask = self
            .table
            .get(id)
            .ok_or(CoordinatorError::UnknownObject(id))?;

        let failures = self.mutate(mask, |index| index.remove(id));
        self.table.release(id);

        if failures.is_empty() {
            trace!(%id, %mask, "removed");
            return Ok(());
        }

        warn!(%id, orphaned = %failures.layers(), "remove failed on some layers");
        Err(CoordinatorError::LayerRemoveFailed { id, failures })
    }

    /// Push new bounds for `id` to every layer it occupies.
    ///
    /// The object's mask never changes; move it between layers with
    /// [`remove`](Self::remove) followed by [`insert`](Self::insert).
    pub fn update(&self, id: ObjectId, bounds: &I::Bounds) -> CoordinatorResult<(), I::Error> {
        let mask = self
            .table
            .get(id)
            .ok_or(CoordinatorError::UnknownObject(id))?;

        let failures = self.mutate(mask, |index| index.update(id, bounds));
        if failures.is_empty() {
            trace!(%id, %mask, "updated");
            return Ok(());
        }

        warn!(%id, failed = %failures.layers(), "update failed on some layers");
        Err(CoordinatorError::LayerUpdateFailed { id, failures })
    }

    /// Every object in a layer of `mask` whose bounds intersect `query`.
    ///
    /// Each object appears once however many layers report it. A layer that
    /// fails to answer contributes nothing; the failure is logged, not
    /// returned.
    pub fn broad_phase(&self, mask: LayerMask, query: &I::Bounds) -> FxHashSet<ObjectId> {
        let results = self
            .executor
            .fan_out(mask, &self.layers, |_, index| index.read().query(query));

        let mut hits = FxHashSet::default();
        for (layer, result) in results {
            match result {
                Ok(ids) => hits.extend(ids),
                Err(error) => warn!(%layer, %error, "layer query failed; skipping layer"),
            }
        }
        hits
    }

    /// Layers occupied by `id`, if tracked.
    #[must_use]
    pub fn layers_of(&self, id: ObjectId) -> Option<LayerMask> {
        self.table.get(id)
    }

    /// Check if `id` is tracked.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.table.contains(id)
    }

    /// Number of tracked objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if no object is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Every tracked object with its mask, in no particular order.
    #[must_use]
    pub fn members(&self) -> Vec<(ObjectId, LayerMask)> {
        self.table.snapshot()
    }

    /// Read access to one layer's index.
    ///
    /// Holding the guard blocks mutations that target this layer.
    pub fn layer(&self, layer: Layer) -> RwLockReadGuard<'_, I> {
        self.layers[layer.index()].read()
    }

    /// Run a mutation on every layer of `mask` and collect the failures.
    fn mutate<F>(&self, mask: LayerMask, op: F) -> LayerFailures<I::Error>
    where
        F: Fn(&mut I) -> Result<(), I::Error> + Sync,
    {
        self.executor
            .fan_out(mask, &self.layers, |_, index| op(&mut index.write()))
            .into_iter()
            .filter_map(|(layer, result)| result.err().map(|error| LayerFailure { layer, error }))
            .collect()
    }
}

impl<I: LayerIndex> BroadPhaseQuery for LayerCoordinator<I> {
    type Bounds = I::Bounds;

    fn broad_phase(&self, mask: LayerMask, query: &I::Bounds) -> FxHashSet<ObjectId> {
        Self::broad_phase(self, mask, query)
    }
}
