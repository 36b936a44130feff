//! Tree nodes and the read-only view handed out to callers.
//!
//! Nodes live in a [`Slab`] owned by the tree. Child and parent links are
//! [`NodeId`] handles into that arena, so the parent back-reference never
//! owns anything and rotations only rewrite handles.

use core::fmt;
use slab::Slab;

/// Handle to a node inside one tree.
///
/// A handle stays valid until its node is removed or the tree is cleared.
/// Removing a node with two children frees its in-order successor instead,
/// so a handle held for the successor goes stale as well.
///
/// The second field is the generation stamped on the node when it was
/// created. Arena slots are reused, so a stale handle is told apart from the
/// node now occupying its slot by comparing generations.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Copy, Clone)]
pub struct NodeId(pub(crate) usize, pub(crate) u64);

#[derive(PartialEq, Debug, Copy, Clone)]
pub(crate) enum Direction {
    Left = 0,
    Right = 1,
}

impl Direction {
    #[inline(always)]
    pub(crate) fn reverse(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

pub(crate) struct Node<T> {
    pub value: T,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub parent: Option<NodeId>,
    pub generation: u64,
    /// Subtree height, leaf = 1. Only kept current by `AvlTree`.
    pub height: usize,
}

impl<T> Node<T> {
    #[inline]
    pub fn new(value: T, parent: Option<NodeId>, generation: u64) -> Self {
        Self { value, left: None, right: None, parent, generation, height: 1 }
    }

    #[inline(always)]
    pub fn get_child(&self, dir: Direction) -> Option<NodeId> {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    #[inline(always)]
    pub fn set_child(&mut self, dir: Direction, child: Option<NodeId>) {
        match dir {
            Direction::Left => self.left = child,
            Direction::Right => self.right = child,
        }
    }
}

/// Borrowed view of a node.
///
/// Obtained from lookups, bounds, traversal callbacks and iteration. It
/// follows links lazily, so `root.left()?.right()` walks the live structure.
pub struct NodeRef<'a, T> {
    nodes: &'a Slab<Node<T>>,
    id: NodeId,
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}

impl<'a, T> NodeRef<'a, T> {
    #[inline]
    pub(crate) fn new(nodes: &'a Slab<Node<T>>, id: NodeId) -> Self {
        debug_assert!(nodes.contains(id.0));
        Self { nodes, id }
    }

    #[inline(always)]
    fn node(&self) -> &'a Node<T> {
        &self.nodes[self.id.0]
    }

    #[inline]
    fn link(&self, link: Option<NodeId>) -> Option<NodeRef<'a, T>> {
        link.map(|id| NodeRef::new(self.nodes, id))
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn value(&self) -> &'a T {
        &self.node().value
    }

    pub fn left(&self) -> Option<NodeRef<'a, T>> {
        self.link(self.node().left)
    }

    pub fn right(&self) -> Option<NodeRef<'a, T>> {
        self.link(self.node().right)
    }

    pub fn parent(&self) -> Option<NodeRef<'a, T>> {
        self.link(self.node().parent)
    }

    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        let node = self.node();
        node.left.is_none() && node.right.is_none()
    }

    /// Cached subtree height. Meaningful for nodes of an `AvlTree`; a plain
    /// `BinarySearchTree` leaves every node at 1.
    pub fn height(&self) -> usize {
        self.node().height
    }

    /// Left subtree height minus right subtree height, from cached heights.
    pub fn balance(&self) -> isize {
        let node = self.node();
        let h = |link: Option<NodeId>| link.map_or(0, |id| self.nodes[id.0].height) as isize;
        h(node.left) - h(node.right)
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let node = self.node();
        write!(f, "({:?} {:?}", self.id, node.value)?;
        match node.left {
            Some(id) => write!(f, " left: {:?}", id)?,
            None => write!(f, " left: none")?,
        }
        match node.right {
            Some(id) => write!(f, " right: {:?}", id)?,
            None => write!(f, " right: none")?,
        }
        write!(f, ")")
    }
}
