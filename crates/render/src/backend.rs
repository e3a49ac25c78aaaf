use crate::ShaderBytecode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("GPU device lost")]
    DeviceLost,
    #[error("out of GPU memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },
    #[error("invalid shader `{name}`: {reason}")]
    InvalidShader { name: String, reason: String },
}

/// An acquired swapchain image, valid until passed to `end_frame`.
#[derive(Debug, PartialEq, Eq)]
pub struct FrameHandle {
    pub index: u64,
}

/// Outcome of [`RenderBackend::begin_frame`].
#[derive(Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Ready(FrameHandle),
    /// The swapchain is out of date; recreate it and skip this frame.
    RecreateSwapchain,
}

/// A vertex/index buffer pair owned by the backend. Capacities count
/// elements, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshBuffers {
    pub id: u64,
    pub vertex_capacity: usize,
    pub index_capacity: usize,
}

/// Opaque handle to a loaded shader module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// What the engine needs from a GPU backend.
///
/// Calls within one frame happen in order `begin_frame`, any number of
/// `draw`s, `end_frame`. Buffer management may happen at any point.
pub trait RenderBackend {
    fn begin_frame(&mut self) -> Result<FrameStatus, RenderError>;

    fn recreate_swapchain(&mut self) -> Result<(), RenderError>;

    fn load_shader(&mut self, shader: &ShaderBytecode) -> Result<ShaderHandle, RenderError>;

    fn create_mesh_buffers(
        &mut self,
        vertex_capacity: usize,
        index_capacity: usize,
    ) -> Result<MeshBuffers, RenderError>;

    fn destroy_mesh_buffers(&mut self, buffers: MeshBuffers);

    /// Overwrite the start of both buffers. The slices must fit the capacities.
    fn write_mesh(
        &mut self,
        buffers: &MeshBuffers,
        vertex_bytes: &[u8],
        index_bytes: &[u8],
    ) -> Result<(), RenderError>;

    fn draw(
        &mut self,
        frame: &FrameHandle,
        buffers: &MeshBuffers,
        index_count: u32,
    ) -> Result<(), RenderError>;

    fn end_frame(&mut self, frame: FrameHandle) -> Result<(), RenderError>;

    fn framebuffer_size(&self) -> (u32, u32);
}
