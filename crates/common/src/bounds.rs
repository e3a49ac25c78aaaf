use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned integer box described by its center and half-size.
///
/// Containment is inclusive on both ends: a box centered at the origin with
/// extents `(32, 32, 32)` contains every point from `-32` to `32` on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub center: IVec3,
    pub extents: IVec3,
}

impl BoundingBox {
    /// Build a box from its center and full size. Odd sizes round down.
    pub fn new(center: IVec3, size: IVec3) -> Self {
        debug_assert!(size.cmpge(IVec3::ZERO).all(), "bounding box size must be non-negative");
        Self {
            center,
            extents: size / 2,
        }
    }

    /// Cube of side `side` centered at `center`.
    pub fn cube(center: IVec3, side: i32) -> Self {
        Self::new(center, IVec3::splat(side))
    }

    pub fn size(&self) -> IVec3 {
        self.extents * 2
    }

    pub fn min(&self) -> IVec3 {
        self.center - self.extents
    }

    pub fn max(&self) -> IVec3 {
        self.center + self.extents
    }

    pub fn set_min_max(&mut self, min: IVec3, max: IVec3) {
        self.extents = (max - min) / 2;
        self.center = min + self.extents;
    }

    /// Grow the box so that it contains `point`.
    pub fn encapsulate_point(&mut self, point: IVec3) {
        let min = self.min().min(point);
        let max = self.max().max(point);
        self.set_min_max(min, max);
    }

    /// Grow the box so that it contains `other` entirely.
    pub fn encapsulate_box(&mut self, other: &BoundingBox) {
        self.encapsulate_point(other.min());
        self.encapsulate_point(other.max());
    }

    /// Copy of this box with `amount / 2` added to the extents on each axis.
    ///
    /// Saturates instead of overflowing so that oversized probe distances
    /// simply produce a box covering the whole integer range.
    pub fn expanded(&self, amount: IVec3) -> Self {
        Self {
            center: self.center,
            extents: self.extents.saturating_add(amount / 2),
        }
    }

    pub fn contains(&self, point: IVec3) -> bool {
        let min = self.center.saturating_sub(self.extents);
        let max = self.center.saturating_add(self.extents);
        min.cmple(point).all() && max.cmpge(point).all()
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min().cmple(other.max()).all() && self.max().cmpge(other.min()).all()
    }
}
