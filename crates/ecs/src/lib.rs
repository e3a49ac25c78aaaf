//! Minimal sparse-set ECS.
//!
//! Entities are plain indices into the world's entity list. Each component
//! type gets its own [`Storage`], created lazily on first use and keyed by
//! `TypeId`.
//!
//! # Invariants
//! - Entity indices increase monotonically and are never reused.
//! - For every present entity `e`: `dense[sparse[e]] == e`.
//! - Views enumerate in ascending entity index order.

mod storage;
mod system;
mod view;
mod world;

pub use storage::Storage;
pub use system::{BoxError, System, SystemError};
pub use view::{View, ViewSet};
pub use world::{Entity, World};

pub fn crate_info() -> &'static str {
    "voxelspace-ecs v0.1.0"
}
