use std::any::{TypeId, type_name};
use std::collections::HashMap;

use crate::storage::{ErasedStorage, Storage};
use crate::view::{View, ViewSet};

/// Opaque entity handle: an index into the world's entity list.
///
/// Indices grow monotonically and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u32);

impl Entity {
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Owns every entity and one sparse-set storage per component type.
///
/// Storages are created lazily the first time a component type is added.
#[derive(Default)]
pub struct World {
    entities: Vec<Entity>,
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh entity whose index equals the current entity count.
    pub fn add_entity(&mut self) -> Entity {
        let index = u32::try_from(self.entities.len()).expect("entity index space exhausted");
        let entity = Entity(index);
        self.entities.push(entity);
        tracing::trace!(index, "entity created");
        entity
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Every entity in creation (ascending index) order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Attach a component and return it for in-place mutation.
    ///
    /// The entity must not already own a `T` (debug assertion).
    pub fn add<T: 'static>(&mut self, entity: Entity, value: T) -> &mut T {
        debug_assert!(
            (entity.index() as usize) < self.entities.len(),
            "{entity:?} was not created by this world"
        );
        self.storage_mut_or_insert::<T>().add(entity, value)
    }

    /// # Panics
    /// If the entity does not own a `T`.
    pub fn get<T: 'static>(&self, entity: Entity) -> &T {
        match self.storage::<T>() {
            Some(storage) => storage.get(entity),
            None => panic!("no {} component has ever been added", type_name::<T>()),
        }
    }

    /// # Panics
    /// If the entity does not own a `T`.
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> &mut T {
        match self.storage_mut::<T>() {
            Some(storage) => storage.get_mut(entity),
            None => panic!("no {} component has ever been added", type_name::<T>()),
        }
    }

    pub fn try_get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.try_get(entity)
    }

    pub fn try_get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>()?.try_get_mut(entity)
    }

    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.has_type(entity, TypeId::of::<T>())
    }

    pub(crate) fn has_type(&self, entity: Entity, type_id: TypeId) -> bool {
        self.storages
            .get(&type_id)
            .is_some_and(|storage| storage.contains(entity))
    }

    /// Detach a component. Returns `None` if the entity did not own one.
    pub fn remove<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        let storage = self.storage_mut::<T>()?;
        if storage.without(entity) {
            return None;
        }
        storage.remove(entity)
    }

    /// Number of entities owning a `T`.
    pub fn count<T: 'static>(&self) -> usize {
        self.storages
            .get(&TypeId::of::<T>())
            .map_or(0, |storage| storage.len())
    }

    pub fn storage<T: 'static>(&self) -> Option<&Storage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref::<Storage<T>>())
    }

    pub fn storage_mut<T: 'static>(&mut self) -> Option<&mut Storage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut::<Storage<T>>())
    }

    fn storage_mut_or_insert<T: 'static>(&mut self) -> &mut Storage<T> {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                tracing::debug!(component = type_name::<T>(), "storage created");
                Box::new(Storage::<T>::new()) as Box<dyn ErasedStorage>
            })
            .as_any_mut()
            .downcast_mut::<Storage<T>>()
            .expect("storage registered under the TypeId of a different type")
    }

    /// Lazy, restartable iteration over entities owning every type in `Q`,
    /// in ascending entity index order.
    ///
    /// `Q` is a tuple of component types: `world.view::<(Mesh, VoxelMap)>()`.
    pub fn view<Q: ViewSet>(&self) -> View<'_> {
        View::new(self, Q::type_ids())
    }

    /// Universal quantifier over every `T`. Short-circuits on the first
    /// counterexample and is vacuously `true` when no entity owns a `T`.
    pub fn all<T: 'static>(&self, mut predicate: impl FnMut(&World, &T) -> bool) -> bool {
        self.view::<(T,)>()
            .all(|entity| predicate(self, self.get::<T>(entity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position(i32);
    #[derive(Debug, PartialEq)]
    struct Velocity(i32);
    struct Quit(bool);

    #[test]
    fn entities_are_monotonic() {
        let mut w = World::new();
        let a = w.add_entity();
        let b = w.add_entity();
        let c = w.add_entity();
        assert_eq!((a.index(), b.index(), c.index()), (0, 1, 2));
        assert_eq!(w.entity_count(), 3);
    }

    #[test]
    fn add_and_get_component() {
        let mut w = World::new();
        let e = w.add_entity();
        w.add(e, Position(4));
        assert_eq!(w.get::<Position>(e), &Position(4));
        w.get_mut::<Position>(e).0 = 9;
        assert_eq!(w.get::<Position>(e), &Position(9));
        assert!(w.has::<Position>(e));
        assert!(!w.has::<Velocity>(e));
    }

    #[test]
    fn add_returns_mutable_reference() {
        let mut w = World::new();
        let e = w.add_entity();
        w.add(e, Velocity(1)).0 += 2;
        assert_eq!(w.get::<Velocity>(e), &Velocity(3));
    }

    #[test]
    fn remove_component() {
        let mut w = World::new();
        let a = w.add_entity();
        let b = w.add_entity();
        w.add(a, Position(1));
        w.add(b, Position(2));
        assert_eq!(w.remove::<Position>(a), Some(Position(1)));
        assert_eq!(w.remove::<Position>(a), None);
        assert_eq!(w.get::<Position>(b), &Position(2));
        assert_eq!(w.count::<Position>(), 1);
    }

    #[test]
    fn try_get_for_unknown_type() {
        let mut w = World::new();
        let e = w.add_entity();
        assert!(w.try_get::<Position>(e).is_none());
        assert!(w.try_get_mut::<Position>(e).is_none());
        assert_eq!(w.count::<Position>(), 0);
    }

    #[test]
    #[should_panic(expected = "no")]
    fn get_of_unknown_type_panics() {
        let mut w = World::new();
        let e = w.add_entity();
        w.get::<Position>(e);
    }

    #[test]
    fn all_is_vacuously_true() {
        let w = World::new();
        assert!(w.all::<Quit>(|_, q| !q.0));
    }

    #[test]
    fn all_finds_counterexample() {
        let mut w = World::new();
        let a = w.add_entity();
        let b = w.add_entity();
        w.add(a, Quit(false));
        w.add(b, Quit(false));
        assert!(w.all::<Quit>(|_, q| !q.0));
        w.get_mut::<Quit>(b).0 = true;
        assert!(!w.all::<Quit>(|_, q| !q.0));
    }

    #[test]
    fn all_short_circuits() {
        let mut w = World::new();
        for _ in 0..4 {
            let e = w.add_entity();
            w.add(e, Quit(true));
        }
        let mut calls = 0;
        assert!(!w.all::<Quit>(|_, q| {
            calls += 1;
            !q.0
        }));
        assert_eq!(calls, 1);
    }
}
