use voxelspace_ecs::{System, SystemError, World};
use voxelspace_mesh::Mesh;

use crate::{
    FrameHandle, FrameStatus, GpuMesh, RenderBackend, RenderError, ShaderBytecode, ShaderHandle,
    builtin_shaders,
};

/// Running frame counters, mirrored onto every entity that owns one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: u64,
    pub skipped: u64,
}

/// Uploads and draws every `(Mesh, GpuMesh)` entity once per tick.
///
/// An out-of-date swapchain skips the frame after recreating it; the meshes
/// are simply drawn on the next tick.
pub struct RenderSystem<B> {
    backend: B,
    shaders: Vec<ShaderHandle>,
    frames_drawn: u64,
    frames_skipped: u64,
}

impl<B: RenderBackend> RenderSystem<B> {
    /// Wrap `backend` and load the built-in voxel shaders into it.
    pub fn new(backend: B) -> Result<Self, RenderError> {
        Self::with_shaders(backend, &builtin_shaders())
    }

    /// Wrap `backend`, loading each of `shaders` once, in order.
    pub fn with_shaders(mut backend: B, shaders: &[ShaderBytecode]) -> Result<Self, RenderError> {
        let handles = shaders
            .iter()
            .map(|shader| backend.load_shader(shader))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = handles.len(), "shaders loaded");
        Ok(Self {
            backend,
            shaders: handles,
            frames_drawn: 0,
            frames_skipped: 0,
        })
    }

    /// Handles of the loaded shaders, in load order.
    pub fn shaders(&self) -> &[ShaderHandle] {
        &self.shaders
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    fn render_frame(&mut self, world: &mut World) -> Result<(), RenderError> {
        let frame = match self.backend.begin_frame()? {
            FrameStatus::Ready(frame) => frame,
            FrameStatus::RecreateSwapchain => {
                self.backend.recreate_swapchain()?;
                self.frames_skipped += 1;
                tracing::debug!(size = ?self.backend.framebuffer_size(), "frame skipped for swapchain recreation");
                return Ok(());
            }
        };

        // A failed draw still closes the frame so the next tick can begin one.
        let drawn = self.draw_meshes(world, &frame);
        let ended = self.backend.end_frame(frame);
        let draws = drawn?;
        ended?;
        self.frames_drawn += 1;
        tracing::trace!(draws, "frame presented");
        Ok(())
    }

    fn draw_meshes(&mut self, world: &mut World, frame: &FrameHandle) -> Result<usize, RenderError> {
        let drawable: Vec<_> = world.view::<(Mesh, GpuMesh)>().collect();
        let mut draws = 0;
        for entity in drawable {
            if world.get::<Mesh>(entity).is_empty() {
                continue;
            }
            let mut gpu = std::mem::take(world.get_mut::<GpuMesh>(entity));
            let synced = gpu.sync(&mut self.backend, world.get::<Mesh>(entity));
            let buffers = gpu.buffers().copied();
            let index_count = gpu.index_count();
            *world.get_mut::<GpuMesh>(entity) = gpu;
            synced?;
            if let Some(buffers) = buffers {
                self.backend.draw(frame, &buffers, index_count)?;
                draws += 1;
            }
        }
        Ok(draws)
    }
}

impl<B: RenderBackend> System for RenderSystem<B> {
    fn name(&self) -> &'static str {
        "render"
    }

    fn run(&mut self, world: &mut World) -> Result<(), SystemError> {
        let _span = tracing::debug_span!("render_frame").entered();
        let result = self.render_frame(world);

        let stats = FrameStats {
            drawn: self.frames_drawn,
            skipped: self.frames_skipped,
        };
        let holders: Vec<_> = world.view::<(FrameStats,)>().collect();
        for entity in holders {
            *world.get_mut::<FrameStats>(entity) = stats;
        }

        result.map_err(|err| {
            tracing::error!(%err, "render backend failed");
            SystemError::new(self.name(), err)
        })
    }
}

#[cfg(test)]
mod tests {
    use voxelspace_mesh::Vertex;

    use super::*;
    use crate::HeadlessBackend;

    fn triangle() -> Mesh {
        Mesh {
            vertices: vec![Vertex::default(); 3],
            indices: vec![0, 1, 2],
        }
    }

    fn world_with(meshes: Vec<Mesh>) -> World {
        let mut world = World::new();
        for mesh in meshes {
            let e = world.add_entity();
            world.add(e, mesh);
            world.add(e, GpuMesh::new());
        }
        world
    }

    #[test]
    fn draws_each_non_empty_mesh() {
        let mut world = world_with(vec![triangle(), Mesh::new(), triangle()]);
        let mut system = RenderSystem::new(HeadlessBackend::new()).unwrap();
        system.run(&mut world).unwrap();

        let backend = system.backend();
        assert_eq!(backend.draws().len(), 2);
        assert!(backend.draws().iter().all(|d| d.index_count == 3));
        assert_eq!(backend.frames_presented(), 1);
        assert_eq!(system.frames_drawn(), 1);
    }

    #[test]
    fn recreate_defers_frame_without_losing_meshes() {
        let mut world = world_with(vec![triangle()]);
        let mut system = RenderSystem::new(HeadlessBackend::new()).unwrap();
        system.backend_mut().request_swapchain_recreate();

        system.run(&mut world).unwrap();
        assert_eq!(system.frames_skipped(), 1);
        assert!(system.backend().draws().is_empty());

        system.run(&mut world).unwrap();
        assert_eq!(system.frames_drawn(), 1);
        assert_eq!(system.backend().draws().len(), 1);
    }

    #[test]
    fn buffers_persist_across_frames() {
        let mut world = world_with(vec![triangle()]);
        let mut system = RenderSystem::new(HeadlessBackend::new()).unwrap();
        for _ in 0..3 {
            system.run(&mut world).unwrap();
        }
        assert_eq!(system.backend().live_buffers(), 1);
        assert_eq!(system.backend().uploads(), 3);
        let gpu = world.get::<GpuMesh>(world.entities()[0]);
        assert_eq!(gpu.reallocations(), 1);
    }

    #[test]
    fn stats_are_mirrored_to_components() {
        let mut world = world_with(vec![triangle()]);
        let clock = world.add_entity();
        world.add(clock, FrameStats::default());
        let mut system = RenderSystem::new(HeadlessBackend::new()).unwrap();
        system.run(&mut world).unwrap();
        system.backend_mut().request_swapchain_recreate();
        system.run(&mut world).unwrap();
        system.run(&mut world).unwrap();
        assert_eq!(*world.get::<FrameStats>(clock), FrameStats { drawn: 2, skipped: 1 });
    }

    #[test]
    fn builtin_shaders_load_once_on_construction() {
        let mut world = world_with(vec![triangle()]);
        let mut system = RenderSystem::new(HeadlessBackend::new()).unwrap();
        assert_eq!(system.shaders(), &[ShaderHandle(0), ShaderHandle(1)]);
        system.run(&mut world).unwrap();
        system.run(&mut world).unwrap();
        assert_eq!(system.backend().shaders(), &["voxel.vert", "voxel.frag"]);
    }

    #[test]
    fn invalid_shader_fails_construction() {
        let bad = ShaderBytecode::from_words("broken.frag", &[0xdead_beef]);
        let err = RenderSystem::with_shaders(HeadlessBackend::new(), &[bad]).err().unwrap();
        assert!(matches!(err, RenderError::InvalidShader { ref name, .. } if name == "broken.frag"));
    }

    #[test]
    fn failed_upload_still_ends_the_frame() {
        let mut world = world_with(vec![triangle()]);
        let backend = HeadlessBackend::new().with_memory_limit(16);
        let mut system = RenderSystem::new(backend).unwrap();

        assert!(system.run(&mut world).is_err());
        assert_eq!(system.backend().frames_presented(), 1);
        // A second attempt can begin its own frame and fails the same way.
        let err = system.run(&mut world).unwrap_err();
        assert!(err.to_string().contains("out of"));
        assert_eq!(system.backend().frames_presented(), 2);
        assert_eq!(system.frames_drawn(), 0);
    }

    #[test]
    fn device_loss_is_a_system_error() {
        let mut world = world_with(vec![triangle()]);
        let mut system = RenderSystem::new(HeadlessBackend::new()).unwrap();
        system.backend_mut().lose_device();
        let err = system.run(&mut world).unwrap_err();
        assert_eq!(err.system, "render");
        assert!(err.to_string().contains("device lost"));
    }
}
