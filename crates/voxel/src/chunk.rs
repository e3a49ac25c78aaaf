use glam::IVec3;
use voxelspace_common::BoundingBox;
use voxelspace_octree::{Iter, Octree, OctreeError};

use crate::Voxel;

/// A cubic region of `size`³ voxels backed by its own octree.
///
/// Voxels are stored under their world positions. The octree is centred on
/// the chunk's world-space centre with side `size`, so every position the
/// chunk owns fits without growing it.
#[derive(Debug, Clone)]
pub struct VoxelChunk {
    coord: IVec3,
    size: i32,
    voxels: Octree<Voxel>,
}

impl VoxelChunk {
    pub fn new(coord: IVec3, size: i32, min_node_size: i32) -> Self {
        let center = coord * size + IVec3::splat(size / 2);
        Self {
            coord,
            size,
            voxels: Octree::new(size, center, min_node_size),
        }
    }

    /// Chunk coordinate (world position floor-divided by the chunk size).
    pub fn coord(&self) -> IVec3 {
        self.coord
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    /// World position of the chunk's minimum corner.
    pub fn origin(&self) -> IVec3 {
        self.coord * self.size
    }

    pub fn bounds(&self) -> BoundingBox {
        self.voxels.max_bounds()
    }

    /// Whether a chunk-local position lies in `0..size` on every axis.
    pub fn inside_chunk(&self, local: IVec3) -> bool {
        local.cmpge(IVec3::ZERO).all() && local.cmplt(IVec3::splat(self.size)).all()
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    pub fn try_get(&self, pos: IVec3) -> Option<&Voxel> {
        self.voxels.try_get(pos)
    }

    /// Every `(voxel, world position)` leaf in the chunk.
    pub fn iter(&self) -> Iter<'_, Voxel> {
        self.voxels.iter()
    }

    pub fn octree(&self) -> &Octree<Voxel> {
        &self.voxels
    }

    pub(crate) fn insert(&mut self, pos: IVec3, voxel: Voxel) -> Result<Option<Voxel>, OctreeError> {
        let previous = self.voxels.remove(pos);
        self.voxels.add(voxel, pos)?;
        Ok(previous)
    }

    pub(crate) fn remove(&mut self, pos: IVec3) -> Option<Voxel> {
        self.voxels.remove(pos)
    }
}
