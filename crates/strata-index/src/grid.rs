//! Uniform-grid spatial hash.

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{Aabb, IndexError, IndexResult, LayerIndex, ObjectId};

/// Integer coordinate of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    /// Create a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive rectangle of cells covered by a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellSpan {
    min: CellCoord,
    max: CellCoord,
}

impl CellSpan {
    /// Number of cells in the span.
    fn len(self) -> u64 {
        let w = (i64::from(self.max.x) - i64::from(self.min.x) + 1) as u64;
        let h = (i64::from(self.max.y) - i64::from(self.min.y) + 1) as u64;
        w.saturating_mul(h)
    }

    fn cells(self) -> impl Iterator<Item = CellCoord> {
        let Self { min, max } = self;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| CellCoord::new(x, y)))
    }
}

/// Grid parameters.
///
/// Always valid once constructed: `cell_size` is finite and positive and
/// `max_cells_per_object` is at least one. Deserialization goes through the
/// same checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGridConfig", into = "RawGridConfig")]
pub struct GridConfig {
    cell_size: f64,
    max_cells_per_object: usize,
}

impl GridConfig {
    /// Default cell edge length in world units.
    pub const DEFAULT_CELL_SIZE: f64 = 16.0;
    /// Default cap on cells an object is hashed into.
    pub const DEFAULT_MAX_CELLS_PER_OBJECT: usize = 64;

    /// Create a validated grid configuration.
    pub fn new(cell_size: f64, max_cells_per_object: usize) -> IndexResult<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(IndexError::InvalidConfig(format!(
                "cell_size must be finite and positive, got {cell_size}"
            )));
        }
        if max_cells_per_object == 0 {
            return Err(IndexError::InvalidConfig(
                "max_cells_per_object must be at least 1".to_owned(),
            ));
        }
        Ok(Self {
            cell_size,
            max_cells_per_object,
        })
    }

    /// Cell edge length in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Objects covering more cells than this are kept on a linear list.
    #[must_use]
    pub const fn max_cells_per_object(&self) -> usize {
        self.max_cells_per_object
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            max_cells_per_object: Self::DEFAULT_MAX_CELLS_PER_OBJECT,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct RawGridConfig {
    cell_size: f64,
    max_cells_per_object: usize,
}

impl Default for RawGridConfig {
    fn default() -> Self {
        GridConfig::default().into()
    }
}

impl TryFrom<RawGridConfig> for GridConfig {
    type Error = IndexError;

    fn try_from(raw: RawGridConfig) -> IndexResult<Self> {
        Self::new(raw.cell_size, raw.max_cells_per_object)
    }
}

impl From<GridConfig> for RawGridConfig {
    fn from(config: GridConfig) -> Self {
        Self {
            cell_size: config.cell_size,
            max_cells_per_object: config.max_cells_per_object,
        }
    }
}

type Bucket = SmallVec<[ObjectId; 4]>;

/// A sparse uniform grid over the plane.
///
/// Each object is listed in every cell its box touches. Boxes touching more
/// than `max_cells_per_object` cells are kept on a separate list that every
/// query tests linearly.
///
/// Query results are exact but not deduplicated: an object spanning several
/// queried cells is reported once per cell.
pub struct GridIndex {
    config: GridConfig,
    cells: HashMap<CellCoord, Bucket, FxBuildHasher>,
    objects: HashMap<ObjectId, Aabb, FxBuildHasher>,
    oversized: Vec<ObjectId>,
}

impl GridIndex {
    /// Create an empty grid.
    #[must_use]
    pub fn with_config(config: GridConfig) -> Self {
        Self {
            config,
            cells: HashMap::default(),
            objects: HashMap::default(),
            oversized: Vec::new(),
        }
    }

    /// Grid parameters.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Get the cell containing a world position.
    #[must_use]
    pub fn cell_at(&self, world_x: f64, world_y: f64) -> CellCoord {
        // `as` saturates, so far-away positions clamp to the outermost cells.
        let x = (world_x / self.config.cell_size).floor() as i32;
        let y = (world_y / self.config.cell_size).floor() as i32;
        CellCoord::new(x, y)
    }

    /// Stored bounds of an object.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&Aabb> {
        self.objects.get(&id)
    }

    /// Check if an object is stored.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the grid is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    fn span_of(&self, bounds: &Aabb) -> CellSpan {
        let [min_x, min_y] = bounds.min();
        let [max_x, max_y] = bounds.max();
        CellSpan {
            min: self.cell_at(min_x, min_y),
            max: self.cell_at(max_x, max_y),
        }
    }

    fn is_oversized(&self, span: CellSpan) -> bool {
        span.len() > self.config.max_cells_per_object as u64
    }

    fn link(&mut self, id: ObjectId, span: CellSpan) {
        if self.is_oversized(span) {
            self.oversized.push(id);
            return;
        }
        for cell in span.cells() {
            self.cells.entry(cell).or_default().push(id);
        }
    }

    fn unlink(&mut self, id: ObjectId, span: CellSpan) {
        if self.is_oversized(span) {
            self.oversized.retain(|other| *other != id);
            return;
        }
        for cell in span.cells() {
            if let Some(bucket) = self.cells.get_mut(&cell) {
                bucket.retain(|other| *other != id);
                if bucket.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    fn stored_overlaps(&self, id: ObjectId, query: &Aabb) -> bool {
        self.objects.get(&id).is_some_and(|b| b.overlaps(query))
    }
}

impl Default for GridIndex {
    fn default() -> Self {
        Self::with_config(GridConfig::default())
    }
}

impl LayerIndex for GridIndex {
    type Bounds = Aabb;
    type Config = GridConfig;
    type Error = IndexError;

    fn new(config: &GridConfig) -> Self {
        Self::with_config(*config)
    }

    fn insert(&mut self, id: ObjectId, bounds: &Aabb) -> IndexResult<()> {
        if self.objects.contains_key(&id) {
            return Err(IndexError::DuplicateId(id));
        }
        self.link(id, self.span_of(bounds));
        self.objects.insert(id, *bounds);
        Ok(())
    }

    fn remove(&mut self, id: ObjectId) -> IndexResult<()> {
        let bounds = self
            .objects
            .remove(&id)
            .ok_or(IndexError::UnknownId(id))?;
        self.unlink(id, self.span_of(&bounds));
        Ok(())
    }

    fn update(&mut self, id: ObjectId, bounds: &Aabb) -> IndexResult<()> {
        let old = *self.objects.get(&id).ok_or(IndexError::UnknownId(id))?;
        let old_span = self.span_of(&old);
        let new_span = self.span_of(bounds);
        if old_span != new_span {
            self.unlink(id, old_span);
            self.link(id, new_span);
        }
        self.objects.insert(id, *bounds);
        Ok(())
    }

    fn query(&self, bounds: &Aabb) -> IndexResult<Vec<ObjectId>> {
        let span = self.span_of(bounds);

        // Walking more cells than are occupied costs more than a full scan.
        if span.len() > self.cells.len() as u64 {
            return Ok(self
                .objects
                .iter()
                .filter(|(_, stored)| stored.overlaps(bounds))
                .map(|(id, _)| *id)
                .collect());
        }

        let mut hits: Vec<ObjectId> = self
            .oversized
            .iter()
            .copied()
            .filter(|id| self.stored_overlaps(*id, bounds))
            .collect();

        for cell in span.cells() {
            if let Some(bucket) = self.cells.get(&cell) {
                hits.extend(
                    bucket
                        .iter()
                        .copied()
                        .filter(|id| self.stored_overlaps(*id, bounds)),
                );
            }
        }

        Ok(hits)
    }
}
