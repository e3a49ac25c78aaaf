use glam::{IVec3, Vec3};
use voxelspace_voxel::{Voxel, VoxelMap};

use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
use crate::{Mesh, Vertex};

/// Density at which the surface is extracted.
pub const ISO_LEVEL: f32 = 0.5;
pub const EPSILON: f32 = 1e-5;

/// Shift applied to every emitted vertex so cells centre on their voxel.
const CELL_OFFSET: Vec3 = Vec3::splat(0.5);

/// 8-bit corner-sign index: bit `i` set when corner `i` lies below [`ISO_LEVEL`].
pub fn cube_index(densities: &[f32; 8]) -> usize {
    densities
        .iter()
        .enumerate()
        .filter(|&(_, &density)| density < ISO_LEVEL)
        .fold(0, |index, (corner, _)| index | (1 << corner))
}

/// Surface crossing on the edge `p1`-`p2`.
///
/// Snaps to `p1` when either sample sits on the iso level or the samples are
/// equal, which also keeps the division below well away from zero.
pub fn interpolate_vertex(p1: Vec3, p2: Vec3, v1: f32, v2: f32) -> Vec3 {
    if (ISO_LEVEL - v1).abs() < EPSILON
        || (ISO_LEVEL - v2).abs() < EPSILON
        || (v1 - v2).abs() < EPSILON
    {
        return p1;
    }
    let mu = (ISO_LEVEL - v1) / (v2 - v1);
    p1 + (p2 - p1) * mu
}

/// Triangulate one cell from its corner samples. Returns the triangle count.
pub fn polygonise_cell(densities: &[f32; 8], positions: &[Vec3; 8], mesh: &mut Mesh) -> usize {
    let index = cube_index(densities);
    if index == 0x00 || index == 0xff {
        return 0;
    }

    let crossed = EDGE_TABLE[index];
    let mut edge_vertices = [Vec3::ZERO; 12];
    for (edge, &(a, b)) in EDGE_CORNERS.iter().enumerate() {
        if crossed & (1 << edge) != 0 {
            edge_vertices[edge] =
                interpolate_vertex(positions[a], positions[b], densities[a], densities[b]);
        }
    }

    let mut triangles = 0;
    for triangle in TRI_TABLE[index].chunks_exact(3) {
        if triangle[0] == -1 {
            break;
        }
        for &edge in triangle {
            let position = edge_vertices[edge as usize] - CELL_OFFSET;
            let vertex = mesh.push_vertex(Vertex::new(position, Vertex::WHITE));
            mesh.indices.push(vertex);
        }
        triangles += 1;
    }
    triangles
}

/// Sample the density field around the non-block voxel at `pos` and
/// triangulate that cell. Missing corners read as density 0.
pub fn mesh_density_cell(map: &VoxelMap, pos: IVec3, mesh: &mut Mesh) -> usize {
    let mut densities = [0.0; 8];
    let mut positions = [Vec3::ZERO; 8];
    for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
        let sample = pos + *offset;
        densities[corner] = map
            .try_get_voxel(sample)
            .map_or(0.0, Voxel::density_value);
        positions[corner] = sample.as_vec3();
    }
    polygonise_cell(&densities, &positions, mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_positions() -> [Vec3; 8] {
        CORNER_OFFSETS.map(|offset| offset.as_vec3())
    }

    #[test]
    fn uniform_cells_emit_nothing() {
        let mut mesh = Mesh::new();
        assert_eq!(polygonise_cell(&[0.0; 8], &unit_positions(), &mut mesh), 0);
        assert_eq!(polygonise_cell(&[1.0; 8], &unit_positions(), &mut mesh), 0);
        assert!(mesh.vertices.is_empty());
    }

    #[test]
    fn single_low_corner_is_one_triangle() {
        let mut densities = [1.0; 8];
        densities[0] = 0.0;
        let mut mesh = Mesh::new();
        assert_eq!(cube_index(&densities), 0x01);
        assert_eq!(polygonise_cell(&densities, &unit_positions(), &mut mesh), 1);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert!(mesh.vertices.iter().all(|v| v.color == Vertex::WHITE));
    }

    #[test]
    fn crossing_lands_halfway_and_is_offset() {
        let mut densities = [1.0; 8];
        densities[0] = 0.0;
        let mut mesh = Mesh::new();
        polygonise_cell(&densities, &unit_positions(), &mut mesh);
        // Edges 0, 8 and 3 all cross at their midpoints, then shift by -0.5.
        let mut positions: Vec<_> = mesh.vertices.iter().map(|v| v.position).collect();
        positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            positions,
            vec![[-0.5, -0.5, 0.0], [-0.5, 0.0, -0.5], [0.0, -0.5, -0.5]]
        );
    }

    #[test]
    fn single_high_corner_is_one_triangle() {
        let mut densities = [0.0; 8];
        densities[6] = 2.0;
        let mut mesh = Mesh::new();
        assert_eq!(cube_index(&densities), 0xbf);
        assert_eq!(polygonise_cell(&densities, &unit_positions(), &mut mesh), 1);
    }

    #[test]
    fn half_split_cell_is_two_triangles() {
        // Bottom four corners below the iso level, top four above.
        let densities = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let mut mesh = Mesh::new();
        assert_eq!(cube_index(&densities), 0x0f);
        assert_eq!(polygonise_cell(&densities, &unit_positions(), &mut mesh), 2);
        for v in &mesh.vertices {
            assert_eq!(v.position[2], 0.0);
        }
    }

    #[test]
    fn interpolation_snaps_degenerate_edges() {
        let p1 = Vec3::ZERO;
        let p2 = Vec3::X;
        assert_eq!(interpolate_vertex(p1, p2, 0.5, 1.0), p1);
        assert_eq!(interpolate_vertex(p1, p2, 0.0, 0.5), p1);
        assert_eq!(interpolate_vertex(p1, p2, 0.7, 0.7), p1);
        assert_eq!(interpolate_vertex(p1, p2, 0.0, 1.0), Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(interpolate_vertex(p1, p2, 0.0, 2.0), Vec3::new(0.25, 0.0, 0.0));
    }

    #[test]
    fn density_cell_reads_neighbours_through_map() {
        let mut map = VoxelMap::new(32).unwrap();
        // One dense voxel at a corner of the cell anchored on (5, 5, 5).
        map.set_voxel(IVec3::new(5, 5, 5), Voxel::with_density(0)).unwrap();
        map.set_voxel(IVec3::new(6, 6, 6), Voxel::with_density(255)).unwrap();
        let mut mesh = Mesh::new();
        assert_eq!(mesh_density_cell(&map, IVec3::new(5, 5, 5), &mut mesh), 1);
    }

    #[test]
    fn empty_neighbourhood_emits_nothing() {
        let mut map = VoxelMap::new(32).unwrap();
        map.set_voxel(IVec3::new(5, 5, 5), Voxel::with_density(0)).unwrap();
        let mut mesh = Mesh::new();
        assert_eq!(mesh_density_cell(&map, IVec3::new(5, 5, 5), &mut mesh), 0);
    }
}
