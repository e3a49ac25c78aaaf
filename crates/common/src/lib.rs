//! Shared geometry for the voxelspace engine.
//!
//! # Invariants
//! - All voxel-space geometry is integer (`glam::IVec3`).
//! - Chunk addressing always floor-divides, including for negative coordinates.

mod bounds;

pub use bounds::BoundingBox;
pub use glam::IVec3;

/// Floor-divide every axis of `pos` by `size` (rounds toward negative infinity).
pub fn floor_div(pos: IVec3, size: i32) -> IVec3 {
    IVec3::new(
        pos.x.div_euclid(size),
        pos.y.div_euclid(size),
        pos.z.div_euclid(size),
    )
}

/// Euclidean remainder of every axis of `pos` by `size`; always in `0..size`.
pub fn floor_rem(pos: IVec3, size: i32) -> IVec3 {
    IVec3::new(
        pos.x.rem_euclid(size),
        pos.y.rem_euclid(size),
        pos.z.rem_euclid(size),
    )
}

pub fn crate_info() -> &'static str {
    "voxelspace-common v0.1.0"
}
