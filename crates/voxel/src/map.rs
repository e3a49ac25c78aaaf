use std::collections::HashMap;

use glam::{IVec3, Vec3};
use voxelspace_common::{floor_div, floor_rem};

use crate::{Voxel, VoxelChunk, VoxelError};

pub const DEFAULT_CHUNK_SIZE: i32 = 32;
pub const DEFAULT_MIN_NODE_SIZE: i32 = 2;

/// Sparse map of chunks keyed by chunk coordinate.
///
/// World positions map to chunks by floor division on every axis, so
/// `-1` belongs to chunk `-1`, never chunk `0`.
#[derive(Debug, Clone)]
pub struct VoxelMap {
    chunk_size: i32,
    min_node_size: i32,
    chunks: HashMap<IVec3, VoxelChunk>,
}

impl Default for VoxelMap {
    fn default() -> Self {
        let mut map = Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_node_size: DEFAULT_MIN_NODE_SIZE,
            chunks: HashMap::new(),
        };
        map.chunk_or_insert(IVec3::ZERO);
        map
    }
}

impl VoxelMap {
    /// A map holding one empty chunk at chunk coordinate `(0, 0, 0)`.
    pub fn new(chunk_size: i32) -> Result<Self, VoxelError> {
        let mut map = Self::empty(chunk_size)?;
        map.chunk_or_insert(IVec3::ZERO);
        Ok(map)
    }

    /// A map with no chunks at all.
    pub fn empty(chunk_size: i32) -> Result<Self, VoxelError> {
        Self::with_min_node_size(chunk_size, DEFAULT_MIN_NODE_SIZE)
    }

    /// An empty map whose chunk octrees stop splitting at `min_node_size`.
    pub fn with_min_node_size(chunk_size: i32, min_node_size: i32) -> Result<Self, VoxelError> {
        if chunk_size <= 0 || (chunk_size & (chunk_size - 1)) != 0 {
            return Err(VoxelError::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            chunk_size,
            min_node_size,
            chunks: HashMap::new(),
        })
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    pub fn min_node_size(&self) -> i32 {
        self.min_node_size
    }

    pub fn world_to_chunk(&self, pos: IVec3) -> IVec3 {
        floor_div(pos, self.chunk_size)
    }

    /// Floor-divides a fractional world position. Agrees with
    /// [`VoxelMap::world_to_chunk`] for every integral input.
    pub fn world_to_chunk_f(&self, pos: Vec3) -> IVec3 {
        (pos / self.chunk_size as f32).floor().as_ivec3()
    }

    pub fn chunk_origin(&self, coord: IVec3) -> IVec3 {
        coord * self.chunk_size
    }

    /// Position relative to the owning chunk's origin, always in `0..chunk_size`.
    pub fn world_to_local(&self, pos: IVec3) -> IVec3 {
        floor_rem(pos, self.chunk_size)
    }

    /// Chunk at a chunk coordinate.
    pub fn chunk(&self, coord: IVec3) -> Option<&VoxelChunk> {
        self.chunks.get(&coord)
    }

    /// Chunk owning a world position.
    pub fn chunk_at(&self, pos: IVec3) -> Option<&VoxelChunk> {
        self.chunk(self.world_to_chunk(pos))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks in unspecified order.
    pub fn chunks(&self) -> impl Iterator<Item = &VoxelChunk> {
        self.chunks.values()
    }

    /// Chunks in ascending `(x, y, z)` coordinate order.
    pub fn sorted_chunks(&self) -> Vec<&VoxelChunk> {
        let mut chunks: Vec<_> = self.chunks.values().collect();
        chunks.sort_by_key(|chunk| chunk.coord().to_array());
        chunks
    }

    pub fn voxel_count(&self) -> usize {
        self.chunks.values().map(VoxelChunk::len).sum()
    }

    /// Voxel stored at a world position. Absent chunks read as not-found.
    pub fn try_get_voxel(&self, pos: IVec3) -> Option<&Voxel> {
        self.chunk_at(pos)?.try_get(pos)
    }

    pub fn is_block(&self, pos: IVec3) -> bool {
        self.try_get_voxel(pos).is_some_and(Voxel::is_block)
    }

    /// Store a voxel, creating its chunk on demand. Returns the voxel it replaced.
    pub fn set_voxel(&mut self, pos: IVec3, voxel: Voxel) -> Result<Option<Voxel>, VoxelError> {
        let coord = self.world_to_chunk(pos);
        let previous = self.chunk_or_insert(coord).insert(pos, voxel)?;
        Ok(previous)
    }

    /// Remove the voxel at a world position. Chunks are kept even when emptied.
    pub fn remove_voxel(&mut self, pos: IVec3) -> Option<Voxel> {
        let coord = self.world_to_chunk(pos);
        self.chunks.get_mut(&coord)?.remove(pos)
    }

    fn chunk_or_insert(&mut self, coord: IVec3) -> &mut VoxelChunk {
        let (size, min_node_size) = (self.chunk_size, self.min_node_size);
        self.chunks.entry(coord).or_insert_with(|| {
            tracing::debug!(?coord, size, "chunk created");
            VoxelChunk::new(coord, size, min_node_size)
        })
    }
}
