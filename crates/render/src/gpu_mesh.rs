use voxelspace_mesh::Mesh;

use crate::{MeshBuffers, RenderBackend, RenderError};

/// GPU copy of an entity's [`Mesh`].
///
/// Buffers only ever grow: they are reallocated when the mesh outgrows them
/// and kept at their high-water size when it shrinks again.
#[derive(Debug, Default)]
pub struct GpuMesh {
    buffers: Option<MeshBuffers>,
    index_count: u32,
    reallocations: u32,
}

impl GpuMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffers(&self) -> Option<&MeshBuffers> {
        self.buffers.as_ref()
    }

    /// Indices uploaded by the last sync.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn reallocations(&self) -> u32 {
        self.reallocations
    }

    /// Upload `mesh`, reallocating first if it exceeds either capacity.
    pub fn sync<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        mesh: &Mesh,
    ) -> Result<(), RenderError> {
        let (vertices, indices) = (mesh.vertices.len(), mesh.indices.len());
        let fits = self
            .buffers
            .is_some_and(|b| vertices <= b.vertex_capacity && indices <= b.index_capacity);

        if !fits {
            let (old_vertices, old_indices) = self
                .buffers
                .map_or((0, 0), |b| (b.vertex_capacity, b.index_capacity));
            let created =
                backend.create_mesh_buffers(vertices.max(old_vertices), indices.max(old_indices))?;
            if let Some(old) = self.buffers.replace(created) {
                backend.destroy_mesh_buffers(old);
            }
            self.reallocations += 1;
            tracing::debug!(
                vertex_capacity = created.vertex_capacity,
                index_capacity = created.index_capacity,
                "mesh buffers reallocated"
            );
        }

        if let Some(buffers) = &self.buffers {
            backend.write_mesh(buffers, mesh.vertex_bytes(), mesh.index_bytes())?;
        }
        self.index_count = indices as u32;
        Ok(())
    }

    /// Release the buffers back to the backend.
    pub fn release<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(buffers) = self.buffers.take() {
            backend.destroy_mesh_buffers(buffers);
        }
        self.index_count = 0;
    }
}
