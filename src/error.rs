use crate::node::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A keyed helper was called on a tree built without `TreeOptions::key`.
    #[error("key extraction is not configured for this tree")]
    KeyNotConfigured,

    #[error("node {node:?} does not order after its in-order predecessor {prev:?}")]
    OrderViolation { prev: NodeId, node: NodeId },

    #[error("node {node:?} has parent {found:?}, expected {expected:?}")]
    ParentMismatch { node: NodeId, expected: Option<NodeId>, found: Option<NodeId> },

    #[error("node {node:?} caches height {cached}, actual {actual}")]
    HeightMismatch { node: NodeId, cached: usize, actual: usize },

    #[error("node {node:?} has balance factor {balance}")]
    Unbalanced { node: NodeId, balance: isize },

    #[error("tree reports {count} nodes but {visited} are reachable from root")]
    CountMismatch { count: usize, visited: usize },
}
