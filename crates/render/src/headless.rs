use std::collections::HashMap;

use voxelspace_mesh::Vertex;

use crate::{
    FrameHandle, FrameStatus, MeshBuffers, RenderBackend, RenderError, ShaderBytecode,
    ShaderHandle,
};

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub frame: u64,
    pub buffers: u64,
    pub index_count: u32,
}

/// In-memory backend that records what the engine asks of the GPU.
///
/// Useful for tests and for running the engine without a window. It can be
/// told to report an out-of-date swapchain, lose its device or enforce a
/// buffer memory budget.
#[derive(Debug)]
pub struct HeadlessBackend {
    framebuffer: (u32, u32),
    buffers: HashMap<u64, MeshBuffers>,
    next_id: u64,
    memory_limit: Option<usize>,
    shaders: Vec<String>,
    pending_recreates: u32,
    recreations: u32,
    open_frame: Option<u64>,
    frames_begun: u64,
    frames_presented: u64,
    uploads: u64,
    draws: Vec<DrawCall>,
    device_lost: bool,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self {
            framebuffer: (1280, 720),
            buffers: HashMap::new(),
            next_id: 0,
            memory_limit: None,
            shaders: Vec::new(),
            pending_recreates: 0,
            recreations: 0,
            open_frame: None,
            frames_begun: 0,
            frames_presented: 0,
            uploads: 0,
            draws: Vec::new(),
            device_lost: false,
        }
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail allocations that would push live buffer memory past `bytes`.
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Make the next `begin_frame` report an out-of-date swapchain.
    pub fn request_swapchain_recreate(&mut self) {
        self.pending_recreates += 1;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer = (width, height);
        self.request_swapchain_recreate();
    }

    /// Every later call fails with [`RenderError::DeviceLost`].
    pub fn lose_device(&mut self) {
        self.device_lost = true;
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Bytes held by live buffers.
    pub fn allocated_bytes(&self) -> usize {
        self.buffers.values().map(buffer_bytes).sum()
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn swapchain_recreations(&self) -> u32 {
        self.recreations
    }

    pub fn shaders(&self) -> &[String] {
        &self.shaders
    }

    fn check_device(&self) -> Result<(), RenderError> {
        if self.device_lost {
            Err(RenderError::DeviceLost)
        } else {
            Ok(())
        }
    }
}

fn buffer_bytes(buffers: &MeshBuffers) -> usize {
    buffers.vertex_capacity * size_of::<Vertex>() + buffers.index_capacity * size_of::<u32>()
}

impl RenderBackend for HeadlessBackend {
    fn begin_frame(&mut self) -> Result<FrameStatus, RenderError> {
        self.check_device()?;
        debug_assert!(self.open_frame.is_none(), "begin_frame called twice");
        if self.pending_recreates > 0 {
            return Ok(FrameStatus::RecreateSwapchain);
        }
        let index = self.frames_begun;
        self.frames_begun += 1;
        self.open_frame = Some(index);
        Ok(FrameStatus::Ready(FrameHandle { index }))
    }

    fn recreate_swapchain(&mut self) -> Result<(), RenderError> {
        self.check_device()?;
        self.pending_recreates = 0;
        self.recreations += 1;
        tracing::debug!(size = ?self.framebuffer, "swapchain recreated");
        Ok(())
    }

    fn load_shader(&mut self, shader: &ShaderBytecode) -> Result<ShaderHandle, RenderError> {
        self.check_device()?;
        shader.validate()?;
        self.shaders.push(shader.name().to_owned());
        Ok(ShaderHandle(self.shaders.len() as u64 - 1))
    }

    fn create_mesh_buffers(
        &mut self,
        vertex_capacity: usize,
        index_capacity: usize,
    ) -> Result<MeshBuffers, RenderError> {
        self.check_device()?;
        let buffers = MeshBuffers {
            id: self.next_id,
            vertex_capacity,
            index_capacity,
        };
        let requested = buffer_bytes(&buffers);
        if let Some(limit) = self.memory_limit {
            if self.allocated_bytes() + requested > limit {
                return Err(RenderError::OutOfMemory { requested });
            }
        }
        self.next_id += 1;
        self.buffers.insert(buffers.id, buffers);
        Ok(buffers)
    }

    fn destroy_mesh_buffers(&mut self, buffers: MeshBuffers) {
        self.buffers.remove(&buffers.id);
    }

    fn write_mesh(
        &mut self,
        buffers: &MeshBuffers,
        vertex_bytes: &[u8],
        index_bytes: &[u8],
    ) -> Result<(), RenderError> {
        self.check_device()?;
        debug_assert!(self.buffers.contains_key(&buffers.id), "write to destroyed buffers");
        debug_assert!(vertex_bytes.len() <= buffers.vertex_capacity * size_of::<Vertex>());
        debug_assert!(index_bytes.len() <= buffers.index_capacity * size_of::<u32>());
        self.uploads += 1;
        Ok(())
    }

    fn draw(
        &mut self,
        frame: &FrameHandle,
        buffers: &MeshBuffers,
        index_count: u32,
    ) -> Result<(), RenderError> {
        self.check_device()?;
        debug_assert_eq!(self.open_frame, Some(frame.index), "draw outside its frame");
        self.draws.push(DrawCall {
            frame: frame.index,
            buffers: buffers.id,
            index_count,
        });
        Ok(())
    }

    fn end_frame(&mut self, frame: FrameHandle) -> Result<(), RenderError> {
        self.check_device()?;
        debug_assert_eq!(self.open_frame, Some(frame.index), "end_frame for a stale frame");
        self.open_frame = None;
        self.frames_presented += 1;
        Ok(())
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer
    }
}
