//! Rendering collaborator: the contract the engine expects from a GPU
//! backend, plus the pieces that sit on the engine side of it.
//!
//! # Invariants
//! - Rendering reads meshes; it never edits voxel data.
//! - Mesh buffers only grow. A smaller mesh reuses the existing allocation.
//! - A swapchain recreation skips the frame, it never drops mesh data.

mod backend;
mod gpu_mesh;
mod headless;
mod shader;
mod system;

pub use backend::{
    FrameHandle, FrameStatus, MeshBuffers, RenderBackend, RenderError, ShaderHandle,
};
pub use gpu_mesh::GpuMesh;
pub use headless::{DrawCall, HeadlessBackend};
pub use shader::{SPIRV_MAGIC, ShaderBytecode, builtin_shaders};
pub use system::{FrameStats, RenderSystem};

pub fn crate_info() -> &'static str {
    "voxelspace-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
