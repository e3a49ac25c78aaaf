use voxelspace_ecs::{System, SystemError, World};
use voxelspace_voxel::VoxelMap;

use crate::{Mesh, rebuild_mesh};

/// Rebuilds the [`Mesh`] of every entity that owns both a [`VoxelMap`] and a
/// `Mesh`, once per tick.
#[derive(Debug, Default)]
pub struct MeshingSystem;

impl MeshingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for MeshingSystem {
    fn name(&self) -> &'static str {
        "meshing"
    }

    fn run(&mut self, world: &mut World) -> Result<(), SystemError> {
        let _span = tracing::debug_span!("meshing").entered();
        let targets: Vec<_> = world.view::<(VoxelMap, Mesh)>().collect();
        for entity in targets {
            let mut mesh = std::mem::take(world.get_mut::<Mesh>(entity));
            rebuild_mesh(world.get::<VoxelMap>(entity), &mut mesh);
            *world.get_mut::<Mesh>(entity) = mesh;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;
    use voxelspace_voxel::Voxel;

    use super::*;

    #[test]
    fn meshes_only_entities_with_both_components() {
        let mut world = World::new();
        let terrain = world.add_entity();
        let mut map = VoxelMap::new(32).unwrap();
        map.set_voxel(IVec3::ONE, Voxel::block(Voxel::WHITE)).unwrap();
        world.add(terrain, map);
        world.add(terrain, Mesh::new());

        let orphan = world.add_entity();
        world.add(orphan, Mesh::new());

        MeshingSystem::new().run(&mut world).unwrap();
        assert_eq!(world.get::<Mesh>(terrain).indices.len(), 36);
        assert!(world.get::<Mesh>(orphan).is_empty());
    }

    #[test]
    fn follows_map_edits_between_ticks() {
        let mut world = World::new();
        let e = world.add_entity();
        world.add(e, VoxelMap::new(32).unwrap());
        world.add(e, Mesh::new());
        let mut system = MeshingSystem::new();

        system.run(&mut world).unwrap();
        assert!(world.get::<Mesh>(e).is_empty());

        world
            .get_mut::<VoxelMap>(e)
            .set_voxel(IVec3::new(4, 4, 4), Voxel::block(Voxel::WHITE))
            .unwrap();
        system.run(&mut world).unwrap();
        assert_eq!(world.get::<Mesh>(e).vertices.len(), 24);

        world.get_mut::<VoxelMap>(e).remove_voxel(IVec3::new(4, 4, 4));
        system.run(&mut world).unwrap();
        assert!(world.get::<Mesh>(e).is_empty());
    }
}
