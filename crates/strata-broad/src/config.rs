//! Coordinator configuration.

use serde::{Deserialize, Serialize};

/// Coordinator configuration.
///
/// `index` is handed unchanged to every one of the sixteen layer indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig<C> {
    /// Configuration shared by every layer index.
    pub index: C,
    /// Initial capacity of the membership table.
    pub table_capacity: usize,
    /// Size of a dedicated fan-out pool. `None` runs on the global rayon pool.
    pub worker_threads: Option<usize>,
}

impl<C> CoordinatorConfig<C> {
    /// Default membership table capacity.
    pub const DEFAULT_TABLE_CAPACITY: usize = 256;

    /// Configuration with default table capacity on the global pool.
    #[must_use]
    pub const fn new(index: C) -> Self {
        Self {
            index,
            table_capacity: Self::DEFAULT_TABLE_CAPACITY,
            worker_threads: None,
        }
    }

    /// Set the membership table capacity.
    #[must_use]
    pub fn with_table_capacity(mut self, capacity: usize) -> Self {
        self.table_capacity = capacity;
        self
    }

    /// Run fan-out on a dedicated pool of `threads` workers.
    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }
}

impl<C: Default> Default for CoordinatorConfig<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}
