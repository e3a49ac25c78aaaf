//! Developer tooling: read-only inspectors that summarise maps, meshes and a
//! running engine.
//!
//! # Invariants
//! - Inspectors never mutate what they look at.
//! - Every summary is `Display` for terminals and `Serialize` for `--json`.

mod inspector;

pub use inspector::{
    ChunkInfo, EngineInspector, EngineSummary, MapInspector, MapSummary, MeshInspector,
    MeshSummary, VoxelInfo,
};

pub fn crate_info() -> &'static str {
    "voxelspace-tools v0.1.0"
}
