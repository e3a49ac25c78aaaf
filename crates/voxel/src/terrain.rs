use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::{Voxel, VoxelError, VoxelFlags, VoxelMap};

/// Parameters of the generated heightfield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Columns generated along X and Y, starting at the origin.
    pub extent: i32,
    pub base_height: i32,
    /// Peak deviation from `base_height`, in voxels.
    pub amplitude: f32,
    pub seed: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            extent: 32,
            base_height: 3,
            amplitude: 2.0,
            seed: 0,
        }
    }
}

/// Smooth height sample in `[-1, 1]`.
pub fn height_sample(x: i32, y: i32, seed: u32) -> f32 {
    let phase = (seed % 10_000) as f32 * 0.618_034;
    let (fx, fy) = (x as f32, y as f32);
    let a = (fx * 0.21 + phase).sin();
    let b = (fy * 0.17 + phase * 1.3).sin();
    let c = ((fx + fy) * 0.11 + phase * 0.7).sin();
    (a + b + c) / 3.0
}

/// Place one ground block per `(x, y)` column in `0..extent`, with +Z up.
///
/// Returns the number of voxels written.
pub fn fill_heightfield(map: &mut VoxelMap, config: &TerrainConfig) -> Result<usize, VoxelError> {
    let _span = tracing::info_span!("fill_heightfield", extent = config.extent).entered();
    let mut placed = 0;
    for x in 0..config.extent {
        for y in 0..config.extent {
            let h = height_sample(x, y, config.seed);
            let z = config.base_height + (h * config.amplitude).round() as i32;
            let shade = (128.0 + h * 64.0) as u8;
            let voxel = Voxel {
                flags: VoxelFlags::IS_BLOCK | VoxelFlags::IS_GROUND,
                density: u8::MAX,
                color: [shade / 2, shade, shade / 3, u8::MAX],
            };
            map.set_voxel(IVec3::new(x, y, z), voxel)?;
            placed += 1;
        }
    }
    tracing::debug!(placed, chunks = map.chunk_count(), "heightfield filled");
    Ok(placed)
}
