use glam::{IVec3, Vec3};
use voxelspace_voxel::{Voxel, VoxelMap};

use crate::{Mesh, Vertex};

const P: f32 = 0.5;

/// Neighbour direction and counter-clockwise corners of each cube face,
/// ordered +Z, -Z, +X, -X, +Y, -Y.
#[rustfmt::skip]
const FACES: [(IVec3, [[f32; 3]; 4]); 6] = [
    (IVec3::new(0, 0, 1),  [[-P, -P,  P], [ P, -P,  P], [ P,  P,  P], [-P,  P,  P]]),
    (IVec3::new(0, 0, -1), [[ P, -P, -P], [-P, -P, -P], [-P,  P, -P], [ P,  P, -P]]),
    (IVec3::new(1, 0, 0),  [[ P, -P,  P], [ P, -P, -P], [ P,  P, -P], [ P,  P,  P]]),
    (IVec3::new(-1, 0, 0), [[-P, -P, -P], [-P, -P,  P], [-P,  P,  P], [-P,  P, -P]]),
    (IVec3::new(0, 1, 0),  [[-P,  P,  P], [ P,  P,  P], [ P,  P, -P], [-P,  P, -P]]),
    (IVec3::new(0, -1, 0), [[-P, -P, -P], [ P, -P, -P], [ P, -P,  P], [-P, -P,  P]]),
];

/// Emit the visible faces of the block voxel at `pos`.
///
/// A face is hidden only when the neighbour across it is itself a block;
/// neighbours are looked up through the map so chunk borders cull too.
/// Returns the number of faces emitted.
pub fn mesh_block(map: &VoxelMap, voxel: &Voxel, pos: IVec3, mesh: &mut Mesh) -> usize {
    let center = pos.as_vec3();
    let color = voxel.color_f32();
    let mut faces = 0;
    for (normal, corners) in &FACES {
        if map.is_block(pos + *normal) {
            continue;
        }
        for corner in corners {
            mesh.push_vertex(Vertex::new(center + Vec3::from_array(*corner), color));
        }
        let v = mesh.vertices.len() as u32;
        mesh.indices
            .extend_from_slice(&[v - 4, v - 3, v - 2, v - 4, v - 2, v - 1]);
        faces += 1;
    }
    faces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> Voxel {
        Voxel::block([255, 0, 0, 255])
    }

    #[test]
    fn isolated_block_has_six_faces() {
        let mut map = VoxelMap::new(32).unwrap();
        map.set_voxel(IVec3::new(4, 4, 4), block()).unwrap();
        let mut mesh = Mesh::new();
        assert_eq!(mesh_block(&map, &block(), IVec3::new(4, 4, 4), &mut mesh), 6);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.vertices.iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn face_indices_follow_quad_pattern() {
        let map = VoxelMap::new(32).unwrap();
        let mut mesh = Mesh::new();
        mesh_block(&map, &block(), IVec3::ZERO, &mut mesh);
        assert_eq!(&mesh.indices[..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(&mesh.indices[6..12], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn faces_span_unit_cube_around_position() {
        let map = VoxelMap::new(32).unwrap();
        let mut mesh = Mesh::new();
        mesh_block(&map, &block(), IVec3::new(2, 3, 4), &mut mesh);
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position) - Vec3::new(2.0, 3.0, 4.0);
            assert_eq!(p.abs(), Vec3::splat(0.5));
        }
    }

    #[test]
    fn shared_face_is_culled() {
        let mut map = VoxelMap::new(32).unwrap();
        map.set_voxel(IVec3::new(1, 1, 1), block()).unwrap();
        map.set_voxel(IVec3::new(2, 1, 1), block()).unwrap();
        let mut mesh = Mesh::new();
        assert_eq!(mesh_block(&map, &block(), IVec3::new(1, 1, 1), &mut mesh), 5);
        // Only the edges of the four side faces touch the shared x = 1.5 plane.
        let on_plane = mesh.vertices.iter().filter(|v| v.position[0] == 1.5).count();
        assert_eq!(on_plane, 8);
    }

    #[test]
    fn density_neighbour_does_not_cull() {
        let mut map = VoxelMap::new(32).unwrap();
        map.set_voxel(IVec3::new(0, 0, 1), Voxel::with_density(255)).unwrap();
        let mut mesh = Mesh::new();
        assert_eq!(mesh_block(&map, &block(), IVec3::ZERO, &mut mesh), 6);
    }

    #[test]
    fn culls_across_chunk_border() {
        let mut map = VoxelMap::new(16).unwrap();
        map.set_voxel(IVec3::new(-1, 0, 0), block()).unwrap();
        map.set_voxel(IVec3::new(0, 0, 0), block()).unwrap();
        assert_ne!(map.world_to_chunk(IVec3::new(-1, 0, 0)), IVec3::ZERO);
        let mut mesh = Mesh::new();
        assert_eq!(mesh_block(&map, &block(), IVec3::ZERO, &mut mesh), 5);
    }
}
