use glam::IVec3;
use voxelspace_common::BoundingBox;

/// Leaf nodes split once they hold this many values.
pub(crate) const NUM_VALS_ALLOWED: usize = 8;

/// Sign of each octant's offset from its parent's center.
///
/// Indexing matches [`Node::best_fit_child`]: bit 0 is +X, bit 1 is +Z and
/// bit 2 is -Y.
const OCTANT_SIGNS: [IVec3; 8] = [
    IVec3::new(-1, 1, -1),
    IVec3::new(1, 1, -1),
    IVec3::new(-1, 1, 1),
    IVec3::new(1, 1, 1),
    IVec3::new(-1, -1, -1),
    IVec3::new(1, -1, -1),
    IVec3::new(-1, -1, 1),
    IVec3::new(1, -1, 1),
];

/// A stored value and the position it was inserted at.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf<T> {
    pub value: T,
    pub pos: IVec3,
}

/// One cubic region of the tree.
///
/// A node either stores leaves directly (`children == None`) or owns exactly
/// eight children and stores nothing itself.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    side_length: i32,
    min_size: i32,
    center: IVec3,
    bounds: BoundingBox,
    leaves: Vec<Leaf<T>>,
    children: Option<Box<[Node<T>; 8]>>,
}

impl<T> Node<T> {
    pub(crate) fn new(side_length: i32, min_size: i32, center: IVec3) -> Self {
        Self {
            side_length,
            min_size,
            center,
            bounds: BoundingBox::cube(center, side_length),
            leaves: Vec::new(),
            children: None,
        }
    }

    pub(crate) fn center(&self) -> IVec3 {
        self.center
    }

    pub(crate) fn side_length(&self) -> i32 {
        self.side_length
    }

    pub(crate) fn leaves(&self) -> &[Leaf<T>] {
        &self.leaves
    }

    pub(crate) fn children(&self) -> Option<&[Node<T>; 8]> {
        self.children.as_deref()
    }

    /// Install eight children. The array type rules out any other count.
    pub(crate) fn set_children(&mut self, children: [Node<T>; 8]) {
        debug_assert!(self.leaves.is_empty(), "internal nodes store no leaves");
        self.children = Some(Box::new(children));
    }

    /// Center of octant `index` for a node of this size.
    pub(crate) fn child_center(&self, index: usize) -> IVec3 {
        self.center + OCTANT_SIGNS[index] * (self.side_length / 4)
    }

    /// Octant `pos` belongs to. Ties on X and Z go to the negative side,
    /// ties on Y go to the positive side.
    pub(crate) fn best_fit_child(&self, pos: IVec3) -> usize {
        let x = if pos.x <= self.center.x { 0 } else { 1 };
        let y = if pos.y >= self.center.y { 0 } else { 4 };
        let z = if pos.z <= self.center.z { 0 } else { 2 };
        x + y + z
    }

    /// Insert if `leaf.pos` lies inside this node; hand it back otherwise.
    pub(crate) fn add(&mut self, leaf: Leaf<T>) -> Result<(), Leaf<T>> {
        if !self.bounds.contains(leaf.pos) {
            return Err(leaf);
        }
        self.sub_add(leaf);
        Ok(())
    }

    fn sub_add(&mut self, leaf: Leaf<T>) {
        if self.children.is_none() {
            if self.leaves.len() < NUM_VALS_ALLOWED || self.side_length / 2 < self.min_size {
                self.leaves.push(leaf);
                return;
            }
            self.split();
        }
        let best_fit = self.best_fit_child(leaf.pos);
        if let Some(children) = self.children.as_mut() {
            children[best_fit].sub_add(leaf);
        }
    }

    /// Create the eight children and push every stored leaf down into them.
    fn split(&mut self) {
        let half = self.side_length / 2;
        let mut children: [Node<T>; 8] =
            std::array::from_fn(|i| Node::new(half, self.min_size, self.child_center(i)));
        let leaves = std::mem::take(&mut self.leaves);
        for leaf in leaves.into_iter().rev() {
            let best_fit = self.best_fit_child(leaf.pos);
            children[best_fit].sub_add(leaf);
        }
        tracing::trace!(center = ?self.center, side = self.side_length, "octree node split");
        self.children = Some(Box::new(children));
    }

    pub(crate) fn try_get(&self, pos: IVec3) -> Option<&T> {
        match &self.children {
            None => self
                .leaves
                .iter()
                .find(|leaf| leaf.pos == pos)
                .map(|leaf| &leaf.value),
            Some(children) => children[self.best_fit_child(pos)].try_get(pos),
        }
    }

    pub(crate) fn try_get_mut(&mut self, pos: IVec3) -> Option<&mut T> {
        let best_fit = self.best_fit_child(pos);
        match &mut self.children {
            None => self
                .leaves
                .iter_mut()
                .find(|leaf| leaf.pos == pos)
                .map(|leaf| &mut leaf.value),
            Some(children) => children[best_fit].try_get_mut(pos),
        }
    }

    /// Remove the first leaf stored exactly at `pos`.
    pub(crate) fn remove_at(&mut self, pos: IVec3) -> Option<T> {
        if !self.bounds.contains(pos) {
            return None;
        }
        self.sub_remove(pos)
    }

    fn sub_remove(&mut self, pos: IVec3) -> Option<T> {
        let mut removed = self
            .leaves
            .iter()
            .position(|leaf| leaf.pos == pos)
            .map(|index| self.leaves.remove(index).value);

        if removed.is_none() {
            let best_fit = self.best_fit_child(pos);
            if let Some(children) = self.children.as_mut() {
                removed = children[best_fit].sub_remove(pos);
            }
        }

        if removed.is_some() && self.should_merge() {
            self.merge();
        }
        removed
    }

    /// Remove the first leaf whose value equals `value`, searching the whole subtree.
    pub(crate) fn remove_value(&mut self, value: &T) -> Option<Leaf<T>>
    where
        T: PartialEq,
    {
        let mut removed = self
            .leaves
            .iter()
            .position(|leaf| leaf.value == *value)
            .map(|index| self.leaves.remove(index));

        if removed.is_none() {
            if let Some(children) = self.children.as_mut() {
                removed = children.iter_mut().find_map(|child| child.remove_value(value));
            }
        }

        if removed.is_some() && self.should_merge() {
            self.merge();
        }
        removed
    }

    /// Collect values within `max_distance` of `pos`.
    ///
    /// Subtrees are pruned with the node bounds padded by `pad` (the distance
    /// rounded up), then each candidate is filtered by its exact distance.
    pub(crate) fn get_nearby<'a>(
        &'a self,
        pos: IVec3,
        max_distance: f32,
        pad: i32,
        result: &mut Vec<&'a T>,
    ) {
        let probe = self.bounds.expanded(IVec3::splat(pad.saturating_mul(2)));
        if !probe.contains(pos) {
            return;
        }

        let origin = pos.as_vec3();
        for leaf in &self.leaves {
            if origin.distance(leaf.pos.as_vec3()) <= max_distance {
                result.push(&leaf.value);
            }
        }

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.get_nearby(pos, max_distance, pad, result);
            }
        }
    }

    pub(crate) fn has_any_objects(&self) -> bool {
        !self.leaves.is_empty()
            || self
                .children
                .as_ref()
                .is_some_and(|children| children.iter().any(Node::has_any_objects))
    }

    /// Few enough values in this node and its (leaf) children to fold them back in.
    fn should_merge(&self) -> bool {
        let Some(children) = &self.children else {
            return false;
        };
        let mut total = self.leaves.len();
        for child in children.iter() {
            if child.children.is_some() {
                return false;
            }
            total += child.leaves.len();
        }
        total <= NUM_VALS_ALLOWED
    }

    /// Pull every child's leaves into this node and drop the children. Only
    /// collapses a single level.
    fn merge(&mut self) {
        if let Some(children) = self.children.take() {
            for child in Vec::from(children as Box<[Node<T>]>) {
                self.leaves.extend(child.leaves.into_iter().rev());
            }
            tracing::trace!(center = ?self.center, side = self.side_length, "octree node merged");
        }
    }

    /// Octant this node could collapse into, or `None` when its contents
    /// span more than one octant.
    ///
    /// An empty node collapses toward the octant containing `anchor`.
    fn shrink_target(&self, anchor: IVec3) -> Option<usize> {
        let mut best_fit = None;
        for leaf in &self.leaves {
            let fit = self.best_fit_child(leaf.pos);
            match best_fit {
                None => best_fit = Some(fit),
                Some(existing) if existing != fit => return None,
                Some(_) => {}
            }
        }

        if let Some(children) = &self.children {
            let mut child_had_content = false;
            for (index, child) in children.iter().enumerate() {
                if !child.has_any_objects() {
                    continue;
                }
                if child_had_content || best_fit.is_some_and(|fit| fit != index) {
                    return None;
                }
                child_had_content = true;
                best_fit = Some(index);
            }
        }

        Some(best_fit.unwrap_or_else(|| self.best_fit_child(anchor)))
    }

    /// Collapse one level if everything fits inside a single octant.
    ///
    /// Refuses while the side length is below `2 * min_length`. A node with
    /// children hands back the occupied child as the new root; a leaf node is
    /// halved in place around that octant's center.
    pub(crate) fn shrink_if_possible(mut self, min_length: i32, anchor: IVec3) -> Node<T> {
        if self.side_length < 2 * min_length {
            return self;
        }
        let Some(best_fit) = self.shrink_target(anchor) else {
            return self;
        };

        match self.children.take() {
            None => {
                let center = self.child_center(best_fit);
                let side = self.side_length / 2;
                let target = BoundingBox::cube(center, side);
                if self.leaves.iter().all(|leaf| target.contains(leaf.pos)) {
                    self.set_values(side, center);
                }
                self
            }
            Some(children) => {
                let mut children = Vec::from(children as Box<[Node<T>]>);
                children.swap_remove(best_fit)
            }
        }
    }

    fn set_values(&mut self, side_length: i32, center: IVec3) {
        self.side_length = side_length;
        self.center = center;
        self.bounds = BoundingBox::cube(center, side_length);
    }
}
