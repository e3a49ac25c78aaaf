//! Voxel data and the chunked map that stores it.
//!
//! # Invariants
//! - A world position belongs to exactly one chunk: `floor(pos / chunk_size)`.
//! - Chunks store voxels under their world positions, never chunk-relative ones.
//! - Missing chunks and missing voxels are ordinary "not found" results.

mod chunk;
mod error;
mod map;
mod terrain;
mod voxel;

pub use chunk::VoxelChunk;
pub use error::VoxelError;
pub use map::{DEFAULT_CHUNK_SIZE, DEFAULT_MIN_NODE_SIZE, VoxelMap};
pub use terrain::{TerrainConfig, fill_heightfield, height_sample};
pub use voxel::{Voxel, VoxelFlags};

pub fn crate_info() -> &'static str {
    "voxelspace-voxel v0.1.0"
}
