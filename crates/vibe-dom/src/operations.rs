//! DOM Node Operations
//!
//! Error type shared by tree manipulation (append, insert, remove).

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found in the arena
    #[error("node {0} not found")]
    NotFound(NodeId),
    /// Inserting a node into its own subtree, or under a leaf
    #[error("hierarchy request error: cannot insert {child} under {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Operation requires an element
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    /// Reference node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
