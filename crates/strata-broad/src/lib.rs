//! Layered broad phase.
//!
//! Objects carry a 16-bit [`LayerMask`] and are indexed in each of the
//! sixteen layer indexes their mask selects. Queries name a mask of their
//! own and see only objects in those layers, which is how collision masks
//! are expressed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  LayerCoordinator                                                   │
//! │    - MembershipTable: ObjectId → LayerMask (short RwLock sections)  │
//! │    - Executor: one rayon task per selected layer, join barrier      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                              │
//!            ┌─────────┬───────┴───────┬─────────┐
//!            ▼         ▼               ▼         ▼
//!         layer 0   layer 1    ...  layer 14  layer 15
//!        (LayerIndex instances, one lock each)
//! ```
//!
//! Mutations fail loudly: any failing layer turns the whole call into an
//! error carrying every per-layer failure. Queries are best effort: a layer
//! that cannot answer contributes nothing.
//!
//! # Usage
//!
//! ```
//! use strata_broad::{LayerCoordinator, LayerMask};
//! use strata_index::{Aabb, GridConfig, GridIndex, ObjectId};
//!
//! let broad = LayerCoordinator::<GridIndex>::with_index_config(&GridConfig::default());
//! let unit = Aabb::new([0.0, 0.0], [1.0, 1.0]).unwrap();
//!
//! broad.insert(ObjectId(1), LayerMask::L0 | LayerMask::L2, &unit).unwrap();
//!
//! assert!(broad.broad_phase(LayerMask::L2, &unit).contains(&ObjectId(1)));
//! assert!(broad.broad_phase(LayerMask::L1, &unit).is_empty());
//! ```

mod config;
mod coordinator;
mod error;
mod fanout;
mod layer;
mod membership;
mod query;

pub use config::CoordinatorConfig;
pub use coordinator::LayerCoordinator;
pub use error::{
    BuildError, CoordinatorError, CoordinatorResult, LayerFailure, LayerFailures,
};
pub use fanout::{Executor, LayerResults};
pub use layer::{LAYER_COUNT, Layer, LayerMask};
pub use membership::MembershipTable;
pub use query::BroadPhaseQuery;
