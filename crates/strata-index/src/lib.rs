//! Single-layer spatial indexing.
//!
//! A layer index stores one bounding box per object and answers overlap
//! queries inside a single partition. The layer coordinator in
//! `strata-broad` owns sixteen of them and fans work out across the ones an
//! object belongs to; this crate only defines what a layer has to provide.
//!
//! # Key Concepts
//!
//! - **ObjectId**: Opaque identifier supplied by the caller
//! - **Aabb**: 2D axis-aligned box, overlap is inclusive on faces
//! - **LayerIndex**: The insert/remove/update/query capability of one layer
//! - **GridIndex**: Uniform-grid spatial hash implementing `LayerIndex`

pub mod aabb;
pub mod error;
pub mod grid;
pub mod id;
pub mod index;

pub use aabb::Aabb;
pub use error::{IndexError, IndexResult};
pub use grid::{GridConfig, GridIndex};
pub use id::ObjectId;
pub use index::LayerIndex;
