use thiserror::Error;
use voxelspace_ecs::SystemError;
use voxelspace_render::RenderError;
use voxelspace_voxel::VoxelError;

use crate::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("voxel map: {0}")]
    Voxel(#[from] VoxelError),
    #[error("render backend: {0}")]
    Render(#[from] RenderError),
    #[error(transparent)]
    System(#[from] SystemError),
}
