use glam::IVec3;
use tracing::{debug, warn};
use voxelspace_common::BoundingBox;

use crate::error::OctreeError;
use crate::node::{Leaf, Node};

/// Growth steps allowed for a single insert before it is reported as an error.
///
/// Kept below the 29 doublings that take a side-2 root to [`MAX_SIDE_LENGTH`],
/// so a far insert into a small tree stops here rather than at the size cap.
pub const MAX_GROW_ATTEMPTS: u32 = 24;

/// Largest root side length; one more doubling would leave `i32` bounds arithmetic.
pub const MAX_SIDE_LENGTH: i32 = 1 << 30;

/// A dynamic point-region octree storing `T` values at integer positions.
///
/// Several values may share a position; they are kept as separate leaves.
#[derive(Debug, Clone)]
pub struct Octree<T> {
    root: Node<T>,
    initial_size: i32,
    initial_pos: IVec3,
    min_size: i32,
    count: usize,
}

impl<T> Octree<T> {
    /// Create an empty tree whose root is a cube of `initial_world_size`
    /// centred on `initial_world_pos`.
    ///
    /// Both sizes are rounded up to a power of two no smaller than 2, so every
    /// node that can split has octants of a whole, non-zero size. A
    /// `min_node_size` larger than the world size is clamped down to it.
    pub fn new(initial_world_size: i32, initial_world_pos: IVec3, min_node_size: i32) -> Self {
        let initial_size = node_size(initial_world_size);
        if initial_size != initial_world_size {
            warn!(
                initial_world_size,
                rounded = initial_size,
                "initial world size is not a power of two of at least 2; rounding up"
            );
        }
        let mut min_size = node_size(min_node_size);
        if min_size != min_node_size {
            debug!(min_node_size, rounded = min_size, "minimum node size rounded up");
        }
        if min_size > initial_size {
            warn!(
                min_node_size,
                initial_world_size = initial_size,
                "minimum node size exceeds initial world size; clamping"
            );
            min_size = initial_size;
        }
        Self {
            root: Node::new(initial_size, min_size, initial_world_pos),
            initial_size,
            initial_pos: initial_world_pos,
            min_size,
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn initial_size(&self) -> i32 {
        self.initial_size
    }

    pub fn min_size(&self) -> i32 {
        self.min_size
    }

    /// Bounds of the current root. Contains every stored position.
    pub fn max_bounds(&self) -> BoundingBox {
        BoundingBox::cube(self.root.center(), self.root.side_length())
    }

    /// Store `value` at `pos`, growing the root until it covers `pos`.
    pub fn add(&mut self, value: T, pos: IVec3) -> Result<(), OctreeError> {
        let mut leaf = Leaf { value, pos };
        let mut attempts = 0;
        loop {
            match self.root.add(leaf) {
                Ok(()) => break,
                Err(rejected) => {
                    if attempts >= MAX_GROW_ATTEMPTS {
                        return Err(OctreeError::GrowthLimitExceeded {
                            position: pos,
                            attempts,
                        });
                    }
                    self.grow(pos)?;
                    attempts += 1;
                    leaf = rejected;
                }
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Value stored exactly at `pos`. Never grows the tree.
    pub fn try_get(&self, pos: IVec3) -> Option<&T> {
        self.root.try_get(pos)
    }

    pub fn try_get_mut(&mut self, pos: IVec3) -> Option<&mut T> {
        self.root.try_get_mut(pos)
    }

    pub fn contains(&self, pos: IVec3) -> bool {
        self.try_get(pos).is_some()
    }

    /// Remove one value stored exactly at `pos`, then try to shrink the root.
    pub fn remove(&mut self, pos: IVec3) -> Option<T> {
        let removed = self.root.remove_at(pos)?;
        self.count -= 1;
        self.shrink();
        Some(removed)
    }

    /// Remove the first value equal to `value`, wherever it is stored.
    pub fn remove_value(&mut self, value: &T) -> Option<Leaf<T>>
    where
        T: PartialEq,
    {
        let removed = self.root.remove_value(value)?;
        self.count -= 1;
        self.shrink();
        Some(removed)
    }

    /// Every value within Euclidean `max_distance` of `pos`.
    pub fn get_nearby(&self, pos: IVec3, max_distance: f32) -> Vec<&T> {
        let pad = (max_distance.ceil() as i32).max(0);
        let mut result = Vec::new();
        self.root.get_nearby(pos, max_distance, pad, &mut result);
        result
    }

    /// Depth-first over every stored leaf.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: vec![&self.root],
            leaves: Default::default(),
        }
    }

    /// Double the root toward `pos`, keeping the old root as one of the new
    /// root's children when it holds anything.
    fn grow(&mut self, pos: IVec3) -> Result<(), OctreeError> {
        let old_center = self.root.center();
        let old_side = self.root.side_length();
        let half = old_side / 2;

        let new_side = old_side
            .checked_mul(2)
            .filter(|&side| side <= MAX_SIDE_LENGTH)
            .ok_or(OctreeError::SizeOverflow { position: pos })?;
        let new_center = step_toward(old_center, pos, half)
            .ok_or(OctreeError::SizeOverflow { position: pos })?;

        let old_root = std::mem::replace(
            &mut self.root,
            Node::new(new_side, self.min_size, new_center),
        );
        if old_root.has_any_objects() {
            let slot = self.root.best_fit_child(old_center);
            let mut children: [Node<T>; 8] = std::array::from_fn(|i| {
                Node::new(old_side, self.min_size, self.root.child_center(i))
            });
            children[slot] = old_root;
            self.root.set_children(children);
        }

        debug!(side = new_side, center = ?new_center, toward = ?pos, "octree grew");
        Ok(())
    }

    fn shrink(&mut self) {
        let side = self.root.side_length();
        let root = std::mem::replace(&mut self.root, Node::new(1, 1, IVec3::ZERO));
        self.root = root.shrink_if_possible(self.initial_size, self.initial_pos);
        if self.root.side_length() != side {
            debug!(
                side = self.root.side_length(),
                center = ?self.root.center(),
                "octree shrank"
            );
        }
    }
}

/// Smallest power of two that is at least `size` and at least 2.
fn node_size(size: i32) -> i32 {
    let size = size.clamp(2, MAX_SIDE_LENGTH) as u32;
    size.next_power_of_two() as i32
}

/// Move `from` by `amount` along every axis, toward `to` (ties step positive).
fn step_toward(from: IVec3, to: IVec3, amount: i32) -> Option<IVec3> {
    let axis = |f: i32, t: i32| f.checked_add(if t >= f { amount } else { -amount });
    Some(IVec3::new(
        axis(from.x, to.x)?,
        axis(from.y, to.y)?,
        axis(from.z, to.z)?,
    ))
}

/// Iterator over every [`Leaf`] in an [`Octree`].
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
    leaves: std::slice::Iter<'a, Leaf<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a Leaf<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(leaf) = self.leaves.next() {
                return Some(leaf);
            }
            let node = self.stack.pop()?;
            self.leaves = node.leaves().iter();
            if let Some(children) = node.children() {
                self.stack.extend(children.iter().rev());
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a Octree<T> {
    type Item = &'a Leaf<T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scatter(n: i32) -> Vec<IVec3> {
        // Deterministic spread over roughly [-40, 40]^3.
        (0..n)
            .map(|i| IVec3::new((i * 37) % 81 - 40, (i * 53) % 79 - 39, (i * 71) % 83 - 41))
            .collect()
    }

    #[test]
    fn lookup_inside_initial_bounds() {
        let mut tree = Octree::new(64, IVec3::ZERO, 8);
        tree.add("value", IVec3::new(1, 2, 7)).unwrap();
        assert_eq!(tree.try_get(IVec3::new(1, 2, 7)), Some(&"value"));
        assert_eq!(tree.try_get(IVec3::new(50, 50, 50)), None);
        // Lookups never grow the root.
        assert_eq!(tree.max_bounds(), BoundingBox::cube(IVec3::ZERO, 64));
    }

    #[test]
    fn min_size_clamped_to_world_size() {
        let tree: Octree<u8> = Octree::new(16, IVec3::ZERO, 64);
        assert_eq!(tree.min_size(), 16);
        assert_eq!(tree.initial_size(), 16);
    }

    #[test]
    fn grows_to_far_positions_without_losing_values() {
        let mut tree = Octree::new(16, IVec3::ZERO, 1);
        tree.add(1, IVec3::new(2, 2, 2)).unwrap();
        tree.add(2, IVec3::new(-3, 1, 0)).unwrap();
        tree.add(3, IVec3::new(500, -200, 90)).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.try_get(IVec3::new(2, 2, 2)), Some(&1));
        assert_eq!(tree.try_get(IVec3::new(-3, 1, 0)), Some(&2));
        assert_eq!(tree.try_get(IVec3::new(500, -200, 90)), Some(&3));
        let bounds = tree.max_bounds();
        for leaf in tree.iter() {
            assert!(bounds.contains(leaf.pos));
        }
    }

    #[test]
    fn growth_of_empty_tree_moves_root() {
        let mut tree = Octree::new(8, IVec3::ZERO, 1);
        tree.add('a', IVec3::new(20, 0, 0)).unwrap();
        assert!(tree.max_bounds().contains(IVec3::new(20, 0, 0)));
        assert_eq!(tree.try_get(IVec3::new(20, 0, 0)), Some(&'a'));
    }

    #[test]
    fn growth_overflow_is_an_error() {
        let mut tree = Octree::new(1 << 29, IVec3::ZERO, 1);
        let err = tree.add(0u8, IVec3::splat(i32::MAX)).unwrap_err();
        assert!(matches!(err, OctreeError::SizeOverflow { .. }));
        assert!(tree.is_empty());
    }

    #[test]
    fn growth_stops_after_attempt_limit() {
        let mut tree = Octree::new(2, IVec3::ZERO, 1);
        let far = IVec3::new(1 << 28, 0, 0);
        let err = tree.add(0u8, far).unwrap_err();
        assert_eq!(err, OctreeError::GrowthLimitExceeded {
            position: far,
            attempts: MAX_GROW_ATTEMPTS,
        });
        assert!(tree.is_empty());

        // The last position the limit still reaches from a side-2 root.
        let mut tree = Octree::new(2, IVec3::ZERO, 1);
        tree.add(1u8, IVec3::new(1 << 24, 0, 0)).unwrap();
        assert_eq!(tree.max_bounds().size(), IVec3::splat(1 << 25));
    }

    #[test]
    fn sizes_round_up_to_powers_of_two() {
        let tree: Octree<u8> = Octree::new(5, IVec3::ZERO, 3);
        assert_eq!(tree.initial_size(), 8);
        assert_eq!(tree.min_size(), 4);
        let tree: Octree<u8> = Octree::new(1, IVec3::ZERO, 1);
        assert_eq!(tree.initial_size(), 2);
        assert_eq!(tree.min_size(), 2);
        assert_eq!(tree.max_bounds(), BoundingBox::cube(IVec3::ZERO, 2));
    }

    #[test]
    fn unit_world_keeps_duplicates_removable() {
        let mut tree = Octree::new(1, IVec3::ZERO, 1);
        tree.add('a', IVec3::ONE).unwrap();
        tree.add('b', IVec3::ONE).unwrap();
        assert!(tree.remove(IVec3::ONE).is_some());
        assert!(tree.max_bounds().contains(IVec3::ONE));
        assert!(tree.remove(IVec3::ONE).is_some());
        assert!(tree.is_empty());
        assert_eq!(tree.remove(IVec3::ONE), None);
    }

    #[test]
    fn odd_world_size_shrinks_without_stranding_values() {
        let mut tree = Octree::new(5, IVec3::ZERO, 1);
        tree.add(1, IVec3::new(6, 6, 6)).unwrap();
        tree.add(2, IVec3::new(-3, 2, -3)).unwrap();
        assert_eq!(tree.remove(IVec3::new(6, 6, 6)), Some(1));
        assert!(tree.max_bounds().contains(IVec3::new(-3, 2, -3)));
        assert_eq!(tree.remove(IVec3::new(-3, 2, -3)), Some(2));
        assert!(tree.is_empty());
        assert_eq!(tree.max_bounds().size(), IVec3::splat(8));
    }

    #[test]
    fn every_value_retrievable_until_removed() {
        let mut tree = Octree::new(16, IVec3::ZERO, 1);
        let positions = scatter(200);
        for (i, &pos) in positions.iter().enumerate() {
            tree.add(i, pos).unwrap();
        }
        assert_eq!(tree.len(), positions.len());
        assert_eq!(tree.iter().count(), positions.len());

        for (i, &pos) in positions.iter().enumerate() {
            assert!(tree.contains(pos));
            assert!(tree.remove(pos).is_some(), "value {i} missing");
            assert_eq!(tree.len(), positions.len() - i - 1);
            for &rest in &positions[i + 1..] {
                assert!(tree.contains(rest));
            }
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn removing_everything_shrinks_toward_initial_size() {
        let mut tree = Octree::new(16, IVec3::ZERO, 1);
        let positions = scatter(60);
        for (i, &pos) in positions.iter().enumerate() {
            tree.add(i, pos).unwrap();
        }
        let grown = tree.max_bounds().size().x;
        assert!(grown > 16);

        for &pos in &positions {
            tree.remove(pos);
        }
        assert!(tree.is_empty());
        assert!(tree.max_bounds().size().x < grown);
        assert!(tree.max_bounds().size().x >= 16);
    }

    #[test]
    fn empty_root_retraces_growth() {
        let mut tree = Octree::new(16, IVec3::ZERO, 1);
        tree.add(7, IVec3::new(100, 0, 0)).unwrap();
        assert!(tree.max_bounds().size().x > 16);
        tree.remove(IVec3::new(100, 0, 0));
        // One level per removal; keep removing from an empty tree is a no-op,
        // so drive the remaining levels through add/remove pairs at the origin.
        for _ in 0..8 {
            tree.add(0, IVec3::ZERO).unwrap();
            tree.remove(IVec3::ZERO);
        }
        assert_eq!(tree.max_bounds(), BoundingBox::cube(IVec3::ZERO, 16));
    }

    #[test]
    fn remove_missing_position_is_none() {
        let mut tree = Octree::new(16, IVec3::ZERO, 1);
        tree.add(1, IVec3::ONE).unwrap();
        assert_eq!(tree.remove(IVec3::new(2, 2, 2)), None);
        assert_eq!(tree.remove(IVec3::splat(1000)), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn remove_by_value() {
        let mut tree = Octree::new(32, IVec3::ZERO, 1);
        for (i, pos) in scatter(30).into_iter().enumerate() {
            tree.add(i, pos).unwrap();
        }
        let leaf = tree.remove_value(&17).unwrap();
        assert_eq!(leaf.value, 17);
        assert_eq!(leaf.pos, scatter(30)[17]);
        assert_eq!(tree.remove_value(&17), None);
        assert_eq!(tree.len(), 29);
    }

    #[test]
    fn duplicate_positions_are_kept() {
        let mut tree = Octree::new(16, IVec3::ZERO, 1);
        tree.add('a', IVec3::ONE).unwrap();
        tree.add('b', IVec3::ONE).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.remove(IVec3::ONE), Some('a'));
        assert_eq!(tree.try_get(IVec3::ONE), Some(&'b'));
    }

    #[test]
    fn nearby_filters_by_exact_distance() {
        let mut tree = Octree::new(64, IVec3::ZERO, 1);
        tree.add("origin", IVec3::ZERO).unwrap();
        tree.add("near", IVec3::new(1, 1, 0)).unwrap();
        tree.add("edge", IVec3::new(2, 0, 0)).unwrap();
        tree.add("far", IVec3::new(10, 10, 10)).unwrap();

        let mut found = tree.get_nearby(IVec3::ZERO, 1.5);
        found.sort();
        assert_eq!(found, vec![&"near", &"origin"]);

        let mut found = tree.get_nearby(IVec3::ZERO, 2.0);
        found.sort();
        assert_eq!(found, vec![&"edge", &"near", &"origin"]);

        assert!(tree.get_nearby(IVec3::ZERO, -1.0).is_empty());
    }

    #[test]
    fn nearby_reaches_across_split_nodes() {
        let mut tree = Octree::new(64, IVec3::ZERO, 1);
        for (i, pos) in scatter(100).into_iter().enumerate() {
            tree.add(i, pos).unwrap();
        }
        let probe = IVec3::new(3, -2, 5);
        let expected = scatter(100)
            .into_iter()
            .filter(|p| p.as_vec3().distance(probe.as_vec3()) <= 20.0)
            .count();
        assert_eq!(tree.get_nearby(probe, 20.0).len(), expected);
    }

    #[test]
    fn nearby_does_not_change_bounds() {
        let mut tree = Octree::new(16, IVec3::ZERO, 1);
        tree.add(0, IVec3::ZERO).unwrap();
        let before = tree.max_bounds();
        let _ = tree.get_nearby(IVec3::ZERO, 100.0);
        assert_eq!(tree.max_bounds(), before);
    }

    #[test]
    fn try_get_mut_edits_in_place() {
        let mut tree = Octree::new(16, IVec3::ZERO, 1);
        tree.add(1, IVec3::new(3, 3, 3)).unwrap();
        *tree.try_get_mut(IVec3::new(3, 3, 3)).unwrap() = 5;
        assert_eq!(tree.try_get(IVec3::new(3, 3, 3)), Some(&5));
    }
}
