use voxelspace_octree::OctreeError;

#[derive(Debug, thiserror::Error)]
pub enum VoxelError {
    #[error("chunk octree error: {0}")]
    Octree(#[from] OctreeError),
    #[error("chunk size must be a positive power of two, got {0}")]
    InvalidChunkSize(i32),
}
