//! Per-layer fan-out with a join barrier.
//!
//! ```text
//! call(mask = L0 | L2 | L5)
//!   ├─ task L0 ──► slot[0]
//!   ├─ task L2 ──► slot[2]
//!   └─ task L5 ──► slot[5]
//!   ═══ scope end: every task joined ═══
//!   merge slots in layer order
//! ```
//!
//! Each task owns exactly one result slot, so nothing inside the fan-out
//! needs a lock. A failing task never cancels its siblings.

use rayon::{Scope, ThreadPool, ThreadPoolBuilder};
use smallvec::SmallVec;

use crate::{BuildError, LAYER_COUNT, Layer, LayerMask};

/// Results of one fan-out, one entry per selected layer, in layer order.
pub type LayerResults<T> = SmallVec<[(Layer, T); 4]>;

/// Where fan-out tasks run.
pub enum Executor {
    /// The global rayon pool.
    Global,
    /// A pool owned by one coordinator.
    Dedicated(ThreadPool),
}

impl Executor {
    /// Global pool for `None`, otherwise a dedicated pool of that size.
    pub fn new(worker_threads: Option<usize>) -> Result<Self, BuildError> {
        let Some(threads) = worker_threads else {
            return Ok(Self::Global);
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("strata-layer-{i}"))
            .build()?;
        Ok(Self::Dedicated(pool))
    }

    /// Number of worker threads tasks are spread over.
    #[must_use]
    pub fn threads(&self) -> usize {
        match self {
            Self::Global => rayon::current_num_threads(),
            Self::Dedicated(pool) => pool.current_num_threads(),
        }
    }

    /// Run `op` once per layer selected by `mask`, each on its own task, and
    /// return only after every task has finished.
    pub fn fan_out<S, T, F>(
        &self,
        mask: LayerMask,
        items: &[S; LAYER_COUNT],
        op: F,
    ) -> LayerResults<T>
    where
        S: Sync,
        T: Send,
        F: Fn(Layer, &S) -> T + Sync,
    {
        let mut slots: [Option<T>; LAYER_COUNT] = std::array::from_fn(|_| None);

        if !mask.is_empty() {
            match self {
                Self::Global => rayon::scope(|s| spawn_layers(s, mask, items, &mut slots, &op)),
                Self::Dedicated(pool) => {
                    pool.scope(|s| spawn_layers(s, mask, items, &mut slots, &op));
                }
            }
        }

        Layer::all()
            .zip(slots)
            .filter_map(|(layer, slot)| slot.map(|value| (layer, value)))
            .collect()
    }
}

fn spawn_layers<'scope, S, T, F>(
    scope: &Scope<'scope>,
    mask: LayerMask,
    items: &'scope [S; LAYER_COUNT],
    slots: &'scope mut [Option<T>; LAYER_COUNT],
    op: &'scope F,
) where
    S: Sync,
    T: Send,
    F: Fn(Layer, &S) -> T + Sync,
{
    for ((layer, item), slot) in Layer::all().zip(items).zip(slots) {
        if mask.contains_layer(layer) {
            scope.spawn(move |_| *slot = Some(op(layer, item)));
        }
    }
}
