//! Object to layer-mask table.

use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, TryReserveError};
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use strata_index::ObjectId;

use crate::LayerMask;

/// Which layers each live object occupies.
///
/// The single source of truth for whether an object exists. Every method
/// takes the lock for the duration of one map access only, so callers never
/// hold it while layer indexes are being touched.
pub struct MembershipTable {
    entries: RwLock<HashMap<ObjectId, LayerMask, FxBuildHasher>>,
}

impl MembershipTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty table with room for `capacity` objects.
    ///
    /// # Panics
    ///
    /// If `capacity` overflows the table size. Use [`Self::try_with_capacity`]
    /// for untrusted input.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity_and_hasher(
                capacity,
                FxBuildHasher,
            )),
        }
    }

    /// Create an empty table with room for `capacity` objects, failing
    /// instead of panicking when that much cannot be reserved.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut entries = HashMap::with_hasher(FxBuildHasher);
        entries.try_reserve(capacity)?;
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Record `id -> mask` unless `id` is already tracked.
    ///
    /// Returns `false`, leaving the existing entry untouched, if it was.
    pub fn claim(&self, id: ObjectId, mask: LayerMask) -> bool {
        match self.entries.write().entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(mask);
                true
            }
        }
    }

    /// Layers occupied by `id`.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<LayerMask> {
        self.entries.read().get(&id).copied()
    }

    /// Drop the entry for `id`, returning its mask.
    pub fn release(&self, id: ObjectId) -> Option<LayerMask> {
        self.entries.write().remove(&id)
    }

    /// Check if `id` is tracked.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.read().contains_key(&id)
    }

    /// Number of tracked objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Number of objects the table holds without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.read().capacity()
    }

    /// Check if no object is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy of every entry, in no particular order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(ObjectId, LayerMask)> {
        self.entries
            .read()
            .iter()
            .map(|(id, mask)| (*id, *mask))
            .collect()
    }
}

impl Default for MembershipTable {
    fn default() -> Self {
        Self::new()
    }
}
