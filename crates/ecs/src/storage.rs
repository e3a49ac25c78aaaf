use std::any::Any;

use crate::Entity;

/// Marker stored in `sparse` for entities that do not own the component.
const ABSENT: u32 = u32::MAX;

/// Sparse-set storage for a single component type.
///
/// - `dense[i]` is the entity index owning slot `i` (insertion order).
/// - `sparse[entity]` is the dense slot for that entity, or `ABSENT`.
/// - `components[i]` is the value for `dense[i]`.
///
/// Removal swaps the last slot into the freed one, so slot order is not stable
/// but per-entity lookup always is.
#[derive(Debug, Clone)]
pub struct Storage<T> {
    dense: Vec<u32>,
    sparse: Vec<u32>,
    components: Vec<T>,
}

impl<T> Default for Storage<T> {
    fn default() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            components: Vec::new(),
        }
    }
}

impl<T> Storage<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `value` to `entity` and return it for in-place mutation.
    ///
    /// The entity must not already own this component. Debug builds panic on a
    /// violation; release builds overwrite the existing value in place so the
    /// sparse/dense mapping stays consistent.
    pub fn add(&mut self, entity: Entity, value: T) -> &mut T {
        let index = entity.index() as usize;
        if let Some(slot) = self.slot(entity) {
            debug_assert!(false, "{entity:?} already owns this component");
            self.components[slot] = value;
            return &mut self.components[slot];
        }
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, ABSENT);
        }
        let slot = self.dense.len();
        self.dense.push(entity.index());
        self.components.push(value);
        self.sparse[index] = slot as u32;
        &mut self.components[slot]
    }

    /// Component of a present entity.
    ///
    /// # Panics
    /// If `entity` does not own the component. Check [`Storage::with`] first
    /// when presence is not already guaranteed by a view.
    pub fn get(&self, entity: Entity) -> &T {
        match self.slot(entity) {
            Some(slot) => &self.components[slot],
            None => panic!("{entity:?} does not own a {}", std::any::type_name::<T>()),
        }
    }

    /// Mutable component of a present entity.
    ///
    /// # Panics
    /// If `entity` does not own the component.
    pub fn get_mut(&mut self, entity: Entity) -> &mut T {
        match self.slot(entity) {
            Some(slot) => &mut self.components[slot],
            None => panic!("{entity:?} does not own a {}", std::any::type_name::<T>()),
        }
    }

    pub fn try_get(&self, entity: Entity) -> Option<&T> {
        self.slot(entity).map(|slot| &self.components[slot])
    }

    pub fn try_get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.slot(entity).map(|slot| &mut self.components[slot])
    }

    /// O(1) membership test. Never grows the sparse array.
    pub fn with(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    pub fn without(&self, entity: Entity) -> bool {
        !self.with(entity)
    }

    /// O(1) swap-remove. Returns the removed value, or `None` (and a debug
    /// assertion) if the entity did not own the component.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let Some(slot) = self.slot(entity) else {
            debug_assert!(false, "{entity:?} does not own this component");
            return None;
        };
        let last = self.dense.len() - 1;
        let moved = self.dense[last];
        self.dense.swap_remove(slot);
        let value = self.components.swap_remove(slot);
        if slot != last {
            self.sparse[moved as usize] = slot as u32;
        }
        self.sparse[entity.index() as usize] = ABSENT;
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Owners in dense slot order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.dense.iter().map(|&index| Entity::from_index(index))
    }

    /// `(entity, component)` pairs in dense slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities().zip(self.components.iter())
    }

    fn slot(&self, entity: Entity) -> Option<usize> {
        let slot = *self.sparse.get(entity.index() as usize)?;
        if slot == ABSENT {
            return None;
        }
        let slot = slot as usize;
        debug_assert_eq!(self.dense.get(slot), Some(&entity.index()));
        Some(slot)
    }
}

/// Type-erased view of a [`Storage`] so the world can hold one per component type.
pub(crate) trait ErasedStorage: Any {
    fn contains(&self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedStorage for Storage<T> {
    fn contains(&self, entity: Entity) -> bool {
        self.with(entity)
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(index: u32) -> Entity {
        Entity::from_index(index)
    }

    #[test]
    fn add_then_get() {
        let mut s = Storage::new();
        s.add(e(3), 30);
        s.add(e(0), 0);
        assert_eq!(*s.get(e(3)), 30);
        assert_eq!(*s.get(e(0)), 0);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn add_returns_mutable_slot() {
        let mut s = Storage::new();
        *s.add(e(1), 5) += 1;
        assert_eq!(*s.get(e(1)), 6);
        *s.get_mut(e(1)) *= 2;
        assert_eq!(*s.get(e(1)), 12);
    }

    #[test]
    fn with_never_grows_sparse() {
        let s: Storage<u8> = Storage::new();
        assert!(!s.with(e(1000)));
        assert!(s.without(e(1000)));
        assert!(s.sparse.is_empty());
    }

    #[test]
    fn sparse_grows_to_entity_index() {
        let mut s = Storage::new();
        s.add(e(41), 'x');
        assert_eq!(s.sparse.len(), 42);
        assert!(s.with(e(41)));
        assert!(!s.with(e(40)));
    }

    #[test]
    fn swap_remove_keeps_survivors() {
        let mut s = Storage::new();
        for i in 0..5 {
            s.add(e(i), i * 10);
        }
        assert_eq!(s.remove(e(1)), Some(10));
        assert!(!s.with(e(1)));
        for i in [0, 2, 3, 4] {
            assert_eq!(*s.get(e(i)), i * 10);
        }
        assert_eq!(s.remove(e(4)), Some(40));
        assert_eq!(s.remove(e(0)), Some(0));
        assert_eq!(*s.get(e(2)), 20);
        assert_eq!(*s.get(e(3)), 30);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn remove_last_slot() {
        let mut s = Storage::new();
        s.add(e(0), "a");
        s.add(e(1), "b");
        assert_eq!(s.remove(e(1)), Some("b"));
        assert_eq!(*s.get(e(0)), "a");
        s.add(e(1), "c");
        assert_eq!(*s.get(e(1)), "c");
    }

    #[test]
    fn iter_follows_dense_order() {
        let mut s = Storage::new();
        s.add(e(7), 'a');
        s.add(e(2), 'b');
        let pairs: Vec<_> = s.iter().map(|(ent, v)| (ent.index(), *v)).collect();
        assert_eq!(pairs, vec![(7, 'a'), (2, 'b')]);
    }

    #[test]
    fn try_get_on_absent() {
        let mut s: Storage<i32> = Storage::new();
        assert!(s.try_get(e(0)).is_none());
        assert!(s.try_get_mut(e(0)).is_none());
    }

    #[test]
    #[should_panic(expected = "does not own")]
    fn get_absent_panics() {
        let s: Storage<i32> = Storage::new();
        s.get(e(0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already owns")]
    fn double_add_panics_in_debug() {
        let mut s = Storage::new();
        s.add(e(0), 1);
        s.add(e(0), 2);
    }
}
