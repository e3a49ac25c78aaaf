//! Surface extraction: turns voxel maps into indexed triangle meshes.
//!
//! Block voxels become unit cubes with faces between neighbouring blocks
//! culled. Every other voxel anchors a Marching Cubes cell sampled from the
//! density field at its eight corners.
//!
//! # Invariants
//! - Extraction is a full rebuild: the target mesh is cleared first.
//! - Neighbour lookups go through the map, so culling and sampling see
//!   across chunk borders.
//! - Output order is deterministic for a given map.

mod block;
mod extract;
mod marching;
mod mesh;
mod system;
pub mod tables;

pub use block::mesh_block;
pub use extract::{extract_chunk, rebuild_mesh, render_chunk};
pub use marching::{
    EPSILON, ISO_LEVEL, cube_index, interpolate_vertex, mesh_density_cell, polygonise_cell,
};
pub use mesh::{Mesh, Vertex};
pub use system::MeshingSystem;

pub fn crate_info() -> &'static str {
    "voxelspace-mesh v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("mesh"));
    }
}
