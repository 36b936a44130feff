#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]

//! Ordered containers built on an arena of linked nodes.
//!
//! [`BinarySearchTree`] is the plain, unbalanced tree. [`AvlTree`] performs
//! the same edits and then rotates to keep every balance factor within
//! `-1..=1`, which bounds the height by roughly `1.44 * log2(n)`.
//!
//! Values are unique under the comparator given at construction; inserting
//! an equal value overwrites the stored one.
//!
//! ```
//! use search_trees::AvlTree;
//!
//! let mut tree: AvlTree<u32> = [50, 80, 90].into_iter().collect();
//! assert_eq!(*tree.root().unwrap().value(), 80);
//! assert_eq!(tree.upper_bound(&60, true).map(|n| *n.value()), Some(80));
//! assert!(tree.remove(&80));
//! assert_eq!(tree.values().copied().collect::<Vec<_>>(), [50, 90]);
//! ```

pub mod avl;
pub mod bst;
mod error;
pub mod node;

pub use avl::AvlTree;
pub use bst::{BinarySearchTree, CmpFunc, Iter, KeyFunc, TreeOptions, natural_order};
pub use error::{Error, Result};
pub use node::{NodeId, NodeRef};
