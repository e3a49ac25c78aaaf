use std::any::TypeId;

use crate::{Entity, World};

/// A set of component types a [`View`] filters on. Implemented for tuples of
/// one to four `'static` types.
pub trait ViewSet {
    fn type_ids() -> Vec<TypeId>;
}

macro_rules! impl_view_set {
    ($($name:ident),+) => {
        impl<$($name: 'static),+> ViewSet for ($($name,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$name>()),+]
            }
        }
    };
}

impl_view_set!(A);
impl_view_set!(A, B);
impl_view_set!(A, B, C);
impl_view_set!(A, B, C, D);

/// Single-pass forward scan over the world's entity list yielding entities
/// that own every viewed type.
///
/// Holds a shared borrow of the world, so components cannot be added or
/// removed while a view is alive; collect the entities first when a loop
/// needs to mutate.
#[derive(Clone)]
pub struct View<'w> {
    world: &'w World,
    types: Vec<TypeId>,
    head: usize,
}

impl<'w> View<'w> {
    pub(crate) fn new(world: &'w World, types: Vec<TypeId>) -> Self {
        Self {
            world,
            types,
            head: 0,
        }
    }

    /// Rewind to the first entity.
    pub fn reset(&mut self) {
        self.head = 0;
    }

    fn matches(&self, entity: Entity) -> bool {
        self.types
            .iter()
            .all(|&type_id| self.world.has_type(entity, type_id))
    }
}

impl Iterator for View<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let entities = self.world.entities();
        while self.head < entities.len() {
            let entity = entities[self.head];
            self.head += 1;
            if self.matches(entity) {
                return Some(entity);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.world.entity_count() - self.head))
    }
}
