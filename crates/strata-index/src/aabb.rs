//! Axis-aligned bounding boxes.

use crate::{IndexError, IndexResult};

/// A 2D axis-aligned bounding box.
///
/// Invariants:
/// - All coordinates are finite.
/// - `min` is less than or equal to `max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    min: [f64; 2],
    max: [f64; 2],
}

impl Aabb {
    /// Create a box from its minimum and maximum corners.
    pub fn new(min: [f64; 2], max: [f64; 2]) -> IndexResult<Self> {
        let finite = min.iter().chain(&max).all(|v| v.is_finite());
        if !finite || min[0] > max[0] || min[1] > max[1] {
            return Err(IndexError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Create a box centered at `center` with the given half extents.
    pub fn from_center(center: [f64; 2], half_x: f64, half_y: f64) -> IndexResult<Self> {
        Self::new(
            [center[0] - half_x, center[1] - half_y],
            [center[0] + half_x, center[1] + half_y],
        )
    }

    /// Minimum corner.
    #[must_use]
    pub const fn min(&self) -> [f64; 2] {
        self.min
    }

    /// Maximum corner.
    #[must_use]
    pub const fn max(&self) -> [f64; 2] {
        self.max
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }

    /// Returns `true` if the boxes overlap.
    ///
    /// Inclusive on faces: touching boxes overlap, and every box overlaps
    /// itself.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.max[0] < other.min[0]
            || self.min[0] > other.max[0]
            || self.max[1] < other.min[1]
            || self.min[1] > other.max[1])
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            max: [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        }
    }

    /// Grow the box by `margin` on every side.
    ///
    /// A negative margin larger than half the extent is rejected.
    pub fn inflate(&self, margin: f64) -> IndexResult<Self> {
        Self::new(
            [self.min[0] - margin, self.min[1] - margin],
            [self.max[0] + margin, self.max[1] + margin],
        )
    }

    /// Move the box by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> IndexResult<Self> {
        Self::new(
            [self.min[0] + dx, self.min[1] + dy],
            [self.max[0] + dx, self.max[1] + dy],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bb(x0: f64, y0: f64, x1: f64, y1: f64) -> Aabb {
        Aabb::new([x0, y0], [x1, y1]).unwrap()
    }

    #[test]
    fn test_rejects_inverted_and_non_finite() {
        assert!(matches!(
            Aabb::new([1.0, 0.0], [0.0, 1.0]),
            Err(IndexError::InvalidBounds { .. })
        ));
        assert!(Aabb::new([0.0, f64::NAN], [1.0, 1.0]).is_err());
        assert!(Aabb::new([0.0, 0.0], [f64::INFINITY, 1.0]).is_err());
        // Degenerate boxes are points or segments, still valid.
        assert!(Aabb::new([2.0, 2.0], [2.0, 2.0]).is_ok());
    }

    #[test]
    fn test_overlap_is_inclusive_on_faces() {
        let a = bb(0.0, 0.0, 1.0, 1.0);
        let touching = bb(1.0, 0.0, 2.0, 1.0);
        let apart = bb(1.5, 0.0, 2.0, 1.0);

        assert!(a.overlaps(&a));
        assert!(a.overlaps(&touching));
        assert!(touching.overlaps(&a));
        assert!(!a.overlaps(&apart));
    }

    #[test]
    fn test_union_inflate_translate() {
        let a = bb(0.0, 0.0, 1.0, 1.0);
        let b = bb(3.0, -1.0, 4.0, 0.5);

        assert_eq!(a.union(&b), bb(0.0, -1.0, 4.0, 1.0));
        assert_eq!(a.inflate(0.5).unwrap(), bb(-0.5, -0.5, 1.5, 1.5));
        assert!(a.inflate(-1.0).is_err());
        assert_eq!(a.translate(2.0, 3.0).unwrap(), bb(2.0, 3.0, 3.0, 4.0));
        assert_eq!(a.center(), [0.5, 0.5]);
    }
}
