//! Point-region octree keyed by integer voxel positions.
//!
//! Every value is stored together with the exact position it was inserted at.
//! The root grows toward out-of-range positions and shrinks back toward its
//! initial size as values are removed.
//!
//! # Invariants
//! - A node either holds leaves or exactly eight children, never both.
//! - A leaf node holds at most 8 values unless halving it would drop below
//!   the minimum node size.
//! - The root side length never falls below the initial world size.

mod error;
mod node;
mod octree;

pub use error::OctreeError;
pub use node::Leaf;
pub use octree::{Iter, MAX_GROW_ATTEMPTS, MAX_SIDE_LENGTH, Octree};

pub fn crate_info() -> &'static str {
    "voxelspace-octree v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("octree"));
    }
}
