use voxelspace_voxel::{VoxelChunk, VoxelMap};

use crate::Mesh;
use crate::block::mesh_block;
use crate::marching::mesh_density_cell;

/// Append the surface of one chunk to `mesh` without clearing it.
///
/// Block voxels become culled unit cubes; every other voxel anchors one
/// Marching Cubes cell. Returns the number of triangles added.
pub fn extract_chunk(map: &VoxelMap, chunk: &VoxelChunk, mesh: &mut Mesh) -> usize {
    let before = mesh.triangle_count();
    for leaf in chunk.iter() {
        if leaf.value.is_block() {
            mesh_block(map, &leaf.value, leaf.pos, mesh);
        } else {
            mesh_density_cell(map, leaf.pos, mesh);
        }
    }
    mesh.triangle_count() - before
}

/// Replace `mesh` with the surface of a single chunk.
pub fn render_chunk(map: &VoxelMap, chunk: &VoxelChunk, mesh: &mut Mesh) {
    mesh.clear();
    extract_chunk(map, chunk, mesh);
}

/// Replace `mesh` with the surface of every chunk, in ascending chunk order.
pub fn rebuild_mesh(map: &VoxelMap, mesh: &mut Mesh) {
    mesh.clear();
    for chunk in map.sorted_chunks() {
        let triangles = extract_chunk(map, chunk, mesh);
        tracing::trace!(coord = ?chunk.coord(), voxels = chunk.len(), triangles, "chunk extracted");
    }
    tracing::debug!(
        vertices = mesh.vertices.len(),
        indices = mesh.indices.len(),
        chunks = map.chunk_count(),
        "mesh rebuilt"
    );
}
