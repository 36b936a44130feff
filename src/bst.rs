//! An unbalanced binary search tree over an arena of nodes.
//!
//! This is the base the [`AvlTree`](crate::avl::AvlTree) builds on: the
//! descent, splice, bound and traversal algorithms live here and are driven
//! purely by the comparator and node links.

use crate::error::{Error, Result};
use crate::node::{Direction, Node, NodeId, NodeRef};
use core::{cmp::Ordering, fmt, mem};
use log::{debug, trace};
use slab::Slab;

/// Total order over stored values.
pub type CmpFunc<T> = fn(&T, &T) -> Ordering;

/// Extracts the ordering key of a stored value, used by the `*_key` lookups.
pub type KeyFunc<T, K> = fn(&T) -> &K;

/// The comparator used by [`BinarySearchTree::new`].
#[inline]
pub fn natural_order<T: Ord>(a: &T, b: &T) -> Ordering {
    a.cmp(b)
}

/// Construction options.
pub struct TreeOptions<T, K> {
    /// Enables `find_key`, `has_key`, `lower_bound_key` and friends. The key
    /// order must agree with the tree's comparator.
    pub key: Option<KeyFunc<T, K>>,
}

impl<T, K> TreeOptions<T, K> {
    pub fn with_key(key: KeyFunc<T, K>) -> Self {
        Self { key: Some(key) }
    }
}

impl<T, K> Default for TreeOptions<T, K> {
    fn default() -> Self {
        Self { key: None }
    }
}

// Outcome of a descent from the root.
#[derive(PartialEq, Debug, Copy, Clone)]
pub(crate) enum Search {
    Empty,
    Found(NodeId),
    // The probe belongs in the empty `dir` slot of this node.
    Vacant(NodeId, Direction),
}

pub struct BinarySearchTree<T, K = ()> {
    pub(crate) nodes: Slab<Node<T>>,
    pub(crate) root: Option<NodeId>,
    // Generation handed to the next created node, never reset.
    generation: u64,
    compare: CmpFunc<T>,
    key: Option<KeyFunc<T, K>>,
}

impl<T: Ord> BinarySearchTree<T> {
    pub fn new() -> Self {
        Self::with_comparator(natural_order::<T>)
    }
}

impl<T: Ord> Default for BinarySearchTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BinarySearchTree<T> {
    pub fn with_comparator(compare: CmpFunc<T>) -> Self {
        Self::with_options(compare, TreeOptions::default())
    }
}

impl<T, K> BinarySearchTree<T, K> {
    pub fn with_options(compare: CmpFunc<T>, options: TreeOptions<T, K>) -> Self {
        BinarySearchTree {
            nodes: Slab::new(),
            root: None,
            generation: 0,
            compare,
            key: options.key,
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[inline]
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.map(|id| self.node_ref(id))
    }

    /// Looks up a node by handle, `None` if the handle is no longer live.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, T>> {
        if self.is_live(id) { Some(self.node_ref(id)) } else { None }
    }

    #[inline(always)]
    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|node| node.generation == id.1)
    }

    #[inline(always)]
    pub(crate) fn node_ref(&self, id: NodeId) -> NodeRef<'_, T> {
        NodeRef::new(&self.nodes, id)
    }

    #[inline(always)]
    pub(crate) fn compare(&self) -> CmpFunc<T> {
        self.compare
    }

    /// Inserts `value`, overwriting the stored value that compares equal to
    /// it if there is one. Returns the handle of the node holding `value`.
    pub fn insert(&mut self, value: T) -> NodeId {
        self.insert_node(value).0
    }

    // Returns the node and whether it was newly created.
    pub(crate) fn insert_node(&mut self, value: T) -> (NodeId, bool) {
        let compare = self.compare;
        match self.search_by(|v| compare(&value, v)) {
            Search::Found(id) => {
                self.nodes[id.0].value = value;
                (id, false)
            }
            Search::Empty => {
                let id = self.alloc(value, None);
                self.root = Some(id);
                (id, true)
            }
            Search::Vacant(parent, dir) => {
                let id = self.alloc(value, Some(parent));
                self.nodes[parent.0].set_child(dir, Some(id));
                (id, true)
            }
        }
    }

    fn alloc(&mut self, value: T, parent: Option<NodeId>) -> NodeId {
        let generation = self.generation;
        self.generation = self.generation.wrapping_add(1);
        NodeId(self.nodes.insert(Node::new(value, parent, generation)), generation)
    }

    #[inline]
    pub fn has(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    pub fn find(&self, value: &T) -> Option<NodeRef<'_, T>> {
        match self.search_by(|v| (self.compare)(value, v)) {
            Search::Found(id) => Some(self.node_ref(id)),
            _ => None,
        }
    }

    /// Left-most node under `from`, or under the root when `from` is `None`.
    pub fn min(&self, from: Option<NodeId>) -> Option<NodeRef<'_, T>> {
        self.end(from, Direction::Left)
    }

    /// Right-most node under `from`, or under the root when `from` is `None`.
    pub fn max(&self, from: Option<NodeId>) -> Option<NodeRef<'_, T>> {
        self.end(from, Direction::Right)
    }

    fn end(&self, from: Option<NodeId>, dir: Direction) -> Option<NodeRef<'_, T>> {
        let start = match from {
            Some(id) if self.is_live(id) => id,
            Some(_) => return None,
            None => self.root?,
        };
        Some(self.node_ref(bottom_child(&self.nodes, start, dir)))
    }

    /// Greatest value less than `value`, or less than or equal when
    /// `include_equal` is set.
    pub fn lower_bound(&self, value: &T, include_equal: bool) -> Option<NodeRef<'_, T>> {
        let id = self.nearest_by(|v| (self.compare)(value, v), Direction::Left, include_equal)?;
        Some(self.node_ref(id))
    }

    #[inline]
    pub fn floor(&self, value: &T, include_equal: bool) -> Option<NodeRef<'_, T>> {
        self.lower_bound(value, include_equal)
    }

    /// Least value greater than `value`, or greater than or equal when
    /// `include_equal` is set.
    pub fn upper_bound(&self, value: &T, include_equal: bool) -> Option<NodeRef<'_, T>> {
        let id =
            self.nearest_by(|v| (self.compare)(value, v), Direction::Right, include_equal)?;
        Some(self.node_ref(id))
    }

    #[inline]
    pub fn ceil(&self, value: &T, include_equal: bool) -> Option<NodeRef<'_, T>> {
        self.upper_bound(value, include_equal)
    }

    /// Removes the value comparing equal to `value`. Returns whether one was
    /// stored.
    #[inline]
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value comparing equal to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        match self.search_by(|v| (self.compare)(value, v)) {
            Search::Found(id) => Some(self.unlink(id).0),
            _ => None,
        }
    }

    /// Removes a node the caller already holds a handle to. Returns `false`
    /// when the handle is stale.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        self.unlink(id);
        true
    }

    /// Drops every node. The tree behaves as freshly constructed afterwards.
    pub fn clear(&mut self) {
        debug!("clear tree with {} nodes", self.count());
        self.nodes.clear();
        self.root = None;
    }

    /// Structurally removes `id` and returns its value together with the
    /// parent of the node that was actually spliced out. With two children
    /// the in-order successor is spliced and its value moved into `id`.
    pub(crate) fn unlink(&mut self, id: NodeId) -> (T, Option<NodeId>) {
        let node = &self.nodes[id.0];
        match (node.left, node.right) {
            (Some(_), Some(right)) => {
                let successor = bottom_child(&self.nodes, right, Direction::Left);
                trace!("remove {:?} by splicing successor {:?}", id, successor);
                let (value, parent) = self.splice(successor);
                (mem::replace(&mut self.nodes[id.0].value, value), parent)
            }
            _ => self.splice(id),
        }
    }

    // `id` has at most one child, which takes its place.
    fn splice(&mut self, id: NodeId) -> (T, Option<NodeId>) {
        let node = &self.nodes[id.0];
        debug_assert!(node.left.is_none() || node.right.is_none());
        let parent = node.parent;
        let child = node.left.or(node.right);

        if let Some(child) = child {
            self.nodes[child.0].parent = parent;
        }
        match parent {
            Some(p) => {
                let dir = parent_direction(&self.nodes, id, p);
                self.nodes[p.0].set_child(dir, child);
            }
            None => self.root = child,
        }
        (self.nodes.remove(id.0).value, parent)
    }

    pub(crate) fn search_by<F: Fn(&T) -> Ordering>(&self, probe: F) -> Search {
        let Some(mut id) = self.root else {
            return Search::Empty;
        };
        loop {
            let node = &self.nodes[id.0];
            let dir = match probe(&node.value) {
                Ordering::Equal => return Search::Found(id),
                Ordering::Less => Direction::Left,
                Ordering::Greater => Direction::Right,
            };
            match node.get_child(dir) {
                Some(child) => id = child,
                None => return Search::Vacant(id, dir),
            }
        }
    }

    // Closest node on the `dir` side of the probe. Every node the probe
    // lies beyond is a candidate, and the descent continues away from `dir`
    // looking for a closer one.
    fn nearest_by<F: Fn(&T) -> Ordering>(
        &self, probe: F, dir: Direction, include_equal: bool,
    ) -> Option<NodeId> {
        let beyond = match dir {
            Direction::Left => Ordering::Greater,
            Direction::Right => Ordering::Less,
        };
        let mut nearest = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id.0];
            let diff = probe(&node.value);
            if diff == beyond || (include_equal && diff == Ordering::Equal) {
                nearest = Some(id);
                cur = node.get_child(dir.reverse());
            } else {
                cur = node.get_child(dir);
            }
        }
        nearest
    }

    /// In-order successor of `id`.
    pub fn next(&self, id: NodeId) -> Option<NodeRef<'_, T>> {
        self.walk(id, Direction::Right)
    }

    /// In-order predecessor of `id`.
    pub fn prev(&self, id: NodeId) -> Option<NodeRef<'_, T>> {
        self.walk(id, Direction::Left)
    }

    fn walk(&self, id: NodeId, dir: Direction) -> Option<NodeRef<'_, T>> {
        if !self.is_live(id) {
            return None;
        }
        walk_dir(&self.nodes, id, dir).map(|id| self.node_ref(id))
    }

    pub fn iter(&self) -> Iter<'_, T> {
        let front = self.root.map(|id| bottom_child(&self.nodes, id, Direction::Left));
        let back = self.root.map(|id| bottom_child(&self.nodes, id, Direction::Right));
        Iter { nodes: &self.nodes, front, back, remaining: self.count() }
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.iter().map(|n| n.value())
    }

    #[inline]
    pub fn traverse_in_order<'a, F: FnMut(NodeRef<'a, T>)>(&'a self, cb: F) {
        self.traverse_in_order_until(cb, || false);
    }

    /// Left, node, right. `abort` is checked before each visit and ends the
    /// walk when it returns true.
    pub fn traverse_in_order_until<'a, F, A>(&'a self, mut cb: F, mut abort: A)
    where
        F: FnMut(NodeRef<'a, T>),
        A: FnMut() -> bool,
    {
        let mut stack: Vec<NodeId> = Vec::new();
        let mut cur = self.root;
        loop {
            while let Some(id) = cur {
                stack.push(id);
                cur = self.nodes[id.0].left;
            }
            let Some(id) = stack.pop() else {
                return;
            };
            if abort() {
                return;
            }
            cb(self.node_ref(id));
            cur = self.nodes[id.0].right;
        }
    }

    #[inline]
    pub fn traverse_pre_order<'a, F: FnMut(NodeRef<'a, T>)>(&'a self, cb: F) {
        self.traverse_pre_order_until(cb, || false);
    }

    /// Node, left, right. See [`Self::traverse_in_order_until`] for `abort`.
    pub fn traverse_pre_order_until<'a, F, A>(&'a self, mut cb: F, mut abort: A)
    where
        F: FnMut(NodeRef<'a, T>),
        A: FnMut() -> bool,
    {
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            if abort() {
                return;
            }
            cb(self.node_ref(id));
            let node = &self.nodes[id.0];
            stack.extend(node.right);
            stack.extend(node.left);
        }
    }

    #[inline]
    pub fn traverse_post_order<'a, F: FnMut(NodeRef<'a, T>)>(&'a self, cb: F) {
        self.traverse_post_order_until(cb, || false);
    }

    /// Left, right, node. See [`Self::traverse_in_order_until`] for `abort`.
    pub fn traverse_post_order_until<'a, F, A>(&'a self, mut cb: F, mut abort: A)
    where
        F: FnMut(NodeRef<'a, T>),
        A: FnMut() -> bool,
    {
        let mut stack: Vec<NodeId> = Vec::new();
        let mut cur = self.root;
        let mut last: Option<NodeId> = None;
        loop {
            if let Some(id) = cur {
                stack.push(id);
                cur = self.nodes[id.0].left;
                continue;
            }
            let Some(&top) = stack.last() else {
                return;
            };
            let right = self.nodes[top.0].right;
            if right.is_some() && right != last {
                cur = right;
            } else {
                if abort() {
                    return;
                }
                cb(self.node_ref(top));
                last = Some(top);
                stack.pop();
            }
        }
    }

    /// Checks ordering, parent links and the node count.
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.root else {
            if self.nodes.is_empty() {
                return Ok(());
            }
            return Err(Error::CountMismatch { count: self.count(), visited: 0 });
        };
        if let Some(found) = self.nodes[root.0].parent {
            return Err(Error::ParentMismatch { node: root, expected: None, found: Some(found) });
        }

        let mut stack: Vec<NodeId> = Vec::new();
        let mut cur = Some(root);
        let mut prev: Option<NodeId> = None;
        let mut visited = 0;
        loop {
            while let Some(id) = cur {
                stack.push(id);
                cur = self.nodes[id.0].left;
            }
            let Some(id) = stack.pop() else {
                break;
            };
            let node = &self.nodes[id.0];
            for child in [node.left, node.right].into_iter().flatten() {
                let found = self.nodes[child.0].parent;
                if found != Some(id) {
                    return Err(Error::ParentMismatch { node: child, expected: Some(id), found });
                }
            }
            if let Some(p) = prev {
                if (self.compare)(&self.nodes[p.0].value, &node.value) != Ordering::Less {
                    return Err(Error::OrderViolation { prev: p, node: id });
                }
            }
            prev = Some(id);
            visited += 1;
            cur = node.right;
        }
        if visited != self.count() {
            return Err(Error::CountMismatch { count: self.count(), visited });
        }
        Ok(())
    }
}

impl<T, K: Ord> BinarySearchTree<T, K> {
    fn key_func(&self) -> Result<KeyFunc<T, K>> {
        self.key.ok_or_else(|| {
            debug!("keyed lookup on a tree without a key extractor");
            Error::KeyNotConfigured
        })
    }

    pub fn find_key(&self, key: &K) -> Result<Option<NodeRef<'_, T>>> {
        let extract = self.key_func()?;
        match self.search_by(|v| key.cmp(extract(v))) {
            Search::Found(id) => Ok(Some(self.node_ref(id))),
            _ => Ok(None),
        }
    }

    pub fn has_key(&self, key: &K) -> Result<bool> {
        Ok(self.find_key(key)?.is_some())
    }

    pub fn lower_bound_key(&self, key: &K, include_equal: bool) -> Result<Option<NodeRef<'_, T>>> {
        let extract = self.key_func()?;
        let id = self.nearest_by(|v| key.cmp(extract(v)), Direction::Left, include_equal);
        Ok(id.map(|id| self.node_ref(id)))
    }

    #[inline]
    pub fn floor_key(&self, key: &K, include_equal: bool) -> Result<Option<NodeRef<'_, T>>> {
        self.lower_bound_key(key, include_equal)
    }

    pub fn upper_bound_key(&self, key: &K, include_equal: bool) -> Result<Option<NodeRef<'_, T>>> {
        let extract = self.key_func()?;
        let id = self.nearest_by(|v| key.cmp(extract(v)), Direction::Right, include_equal);
        Ok(id.map(|id| self.node_ref(id)))
    }

    #[inline]
    pub fn ceil_key(&self, key: &K, include_equal: bool) -> Result<Option<NodeRef<'_, T>>> {
        self.upper_bound_key(key, include_equal)
    }
}

impl<T, K> Extend<T> for BinarySearchTree<T, K> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for BinarySearchTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, T, K> IntoIterator for &'a BinarySearchTree<T, K> {
    type Item = NodeRef<'a, T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: fmt::Debug, K> fmt::Debug for BinarySearchTree<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.values()).finish()
    }
}

/// In-order iterator over the nodes of a tree.
pub struct Iter<'a, T> {
    nodes: &'a Slab<Node<T>>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.remaining -= 1;
        self.front = walk_dir(self.nodes, id, Direction::Right);
        Some(NodeRef::new(self.nodes, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.remaining -= 1;
        self.back = walk_dir(self.nodes, id, Direction::Left);
        Some(NodeRef::new(self.nodes, id))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[inline(always)]
pub(crate) fn bottom_child<T>(nodes: &Slab<Node<T>>, mut id: NodeId, dir: Direction) -> NodeId {
    while let Some(child) = nodes[id.0].get_child(dir) {
        id = child;
    }
    id
}

#[inline(always)]
pub(crate) fn parent_direction<T>(
    nodes: &Slab<Node<T>>, id: NodeId, parent: NodeId,
) -> Direction {
    let parent_node = &nodes[parent.0];
    if parent_node.left == Some(id) {
        return Direction::Left;
    }
    debug_assert_eq!(parent_node.right, Some(id), "{:?} is not a child of {:?}", id, parent);
    Direction::Right
}

// Neighbour of `id` in direction `dir`: the nearest node down that subtree,
// otherwise the first ancestor reached from its `dir.reverse()` side.
fn walk_dir<T>(nodes: &Slab<Node<T>>, id: NodeId, dir: Direction) -> Option<NodeId> {
    let dir_inverse = dir.reverse();
    let node = &nodes[id.0];
    if let Some(child) = node.get_child(dir) {
        return Some(bottom_child(nodes, child, dir_inverse));
    }
    let mut data = id;
    let mut parent = node.parent;
    while let Some(p) = parent {
        if parent_direction(nodes, data, p) == dir_inverse {
            return Some(p);
        }
        data = p;
        parent = nodes[p.0].parent;
    }
    None
}
