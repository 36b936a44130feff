//! A self-balancing AVL tree.
//!
//! Every structural edit is the one [`BinarySearchTree`] performs. Afterwards
//! the path from the edited point back to the root is walked: each node gets
//! its height recomputed, and a node whose balance factor left `-1..=1` is
//! fixed with a single or double rotation. The walk follows the live parent
//! links, so a rotation lower down is already reflected when the next
//! ancestor is visited.
//!
//! Read-only queries (`find`, bounds, traversal, iteration, keyed lookups)
//! are reached through `Deref` to the underlying tree.

use crate::bst::{BinarySearchTree, CmpFunc, Search, TreeOptions, natural_order, parent_direction};
use crate::error::{Error, Result};
use crate::node::{Direction, Node, NodeId, NodeRef};
use core::{fmt, ops::Deref};
use log::trace;
use slab::Slab;

pub struct AvlTree<T, K = ()> {
    tree: BinarySearchTree<T, K>,
}

impl<T: Ord> AvlTree<T> {
    pub fn new() -> Self {
        Self::with_comparator(natural_order::<T>)
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AvlTree<T> {
    pub fn with_comparator(compare: CmpFunc<T>) -> Self {
        Self::with_options(compare, TreeOptions::default())
    }
}

impl<T, K> AvlTree<T, K> {
    pub fn with_options(compare: CmpFunc<T>, options: TreeOptions<T, K>) -> Self {
        AvlTree { tree: BinarySearchTree::with_options(compare, options) }
    }

    /// Inserts `value`, overwriting an equal stored value in place. Only a
    /// newly created leaf triggers rebalancing.
    pub fn insert(&mut self, value: T) -> NodeId {
        let (id, created) = self.tree.insert_node(value);
        if created {
            let parent = self.tree.nodes[id.0].parent;
            self.rebalance(parent);
        }
        id
    }

    #[inline]
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    pub fn take(&mut self, value: &T) -> Option<T> {
        let compare = self.tree.compare();
        match self.tree.search_by(|v| compare(value, v)) {
            Search::Found(id) => {
                let (value, parent) = self.tree.unlink(id);
                self.rebalance(parent);
                Some(value)
            }
            _ => None,
        }
    }

    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.tree.is_live(id) {
            return false;
        }
        let (_, parent) = self.tree.unlink(id);
        self.rebalance(parent);
        true
    }

    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Height of the whole tree, 0 when empty.
    #[inline]
    pub fn height(&self) -> usize {
        height_of(&self.tree.nodes, self.tree.root)
    }

    /// Runs the base checks, then verifies every cached height and balance
    /// factor.
    pub fn validate(&self) -> Result<()> {
        self.tree.validate()?;
        let nodes = &self.tree.nodes;
        for (key, node) in nodes.iter() {
            let id = NodeId(key, node.generation);
            let actual = 1 + height_of(nodes, node.left).max(height_of(nodes, node.right));
            if node.height != actual {
                return Err(Error::HeightMismatch { node: id, cached: node.height, actual });
            }
            let balance = balance_of(nodes, id);
            if !(-1..=1).contains(&balance) {
                return Err(Error::Unbalanced { node: id, balance });
            }
        }
        Ok(())
    }

    // Walks from `from` to the root, restoring heights and balance.
    fn rebalance(&mut self, from: Option<NodeId>) {
        let mut cur = from;
        while let Some(id) = cur {
            update_height(&mut self.tree.nodes, id);
            let balance = balance_of(&self.tree.nodes, id);
            let top = if balance > 1 {
                let left = self.tree.nodes[id.0].left;
                if left.map_or(0, |l| balance_of(&self.tree.nodes, l)) >= 0 {
                    self.rotate_right(id)
                } else {
                    self.rotate_left_right(id)
                }
            } else if balance < -1 {
                let right = self.tree.nodes[id.0].right;
                if right.map_or(0, |r| balance_of(&self.tree.nodes, r)) <= 0 {
                    self.rotate_left(id)
                } else {
                    self.rotate_right_left(id)
                }
            } else {
                id
            };
            cur = self.tree.nodes[top.0].parent;
        }
    }

    #[inline]
    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        self.rotate(id, Direction::Left)
    }

    #[inline]
    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        self.rotate(id, Direction::Right)
    }

    fn rotate_left_right(&mut self, id: NodeId) -> NodeId {
        if let Some(left) = self.tree.nodes[id.0].left {
            self.rotate_left(left);
        }
        self.rotate_right(id)
    }

    fn rotate_right_left(&mut self, id: NodeId) -> NodeId {
        if let Some(right) = self.tree.nodes[id.0].right {
            self.rotate_right(right);
        }
        self.rotate_left(id)
    }

    /// Moves `id` down towards `dir`; its child on the other side is lifted
    /// into its slot and returned. The lifted child's inner subtree is handed
    /// over to `id`. Heights are recomputed for `id` first, then the pivot.
    fn rotate(&mut self, id: NodeId, dir: Direction) -> NodeId {
        let dir_inverse = dir.reverse();
        let nodes = &mut self.tree.nodes;
        let Some(pivot) = nodes[id.0].get_child(dir_inverse) else {
            return id;
        };
        let parent = nodes[id.0].parent;
        let inner = nodes[pivot.0].get_child(dir);

        nodes[id.0].set_child(dir_inverse, inner);
        if let Some(inner) = inner {
            nodes[inner.0].parent = Some(id);
        }

        match parent {
            Some(p) => {
                let which_child = parent_direction(nodes, id, p);
                nodes[p.0].set_child(which_child, Some(pivot));
            }
            None => self.tree.root = Some(pivot),
        }
        nodes[pivot.0].parent = parent;
        nodes[pivot.0].set_child(dir, Some(id));
        nodes[id.0].parent = Some(pivot);

        update_height(nodes, id);
        update_height(nodes, pivot);
        trace!("rotate {:?} {:?}, {:?} lifted", id, dir, pivot);
        pivot
    }
}

#[inline(always)]
fn height_of<T>(nodes: &Slab<Node<T>>, link: Option<NodeId>) -> usize {
    link.map_or(0, |id| nodes[id.0].height)
}

#[inline(always)]
fn balance_of<T>(nodes: &Slab<Node<T>>, id: NodeId) -> isize {
    let node = &nodes[id.0];
    height_of(nodes, node.left) as isize - height_of(nodes, node.right) as isize
}

#[inline(always)]
fn update_height<T>(nodes: &mut Slab<Node<T>>, id: NodeId) {
    let node = &nodes[id.0];
    let height = 1 + height_of(nodes, node.left).max(height_of(nodes, node.right));
    nodes[id.0].height = height;
}

impl<T, K> Deref for AvlTree<T, K> {
    type Target = BinarySearchTree<T, K>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.tree
    }
}

impl<T, K> Extend<T> for AvlTree<T, K> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, T, K> IntoIterator for &'a AvlTree<T, K> {
    type Item = NodeRef<'a, T>;
    type IntoIter = crate::bst::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.iter()
    }
}

impl<T: fmt::Debug, K> fmt::Debug for AvlTree<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}
