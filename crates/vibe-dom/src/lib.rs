//! Vibe DOM - Document Object Model
//!
//! Arena-backed DOM tree used as the page environment for the theming engine.
//! Nodes are never freed: removing a node detaches it, so a `NodeId` stays
//! valid for the lifetime of the document and can be checked for attachment.

mod node;
mod tree;
mod classlist;
mod document;
mod observer;
mod operations;
mod serialize;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Descendants};
pub use classlist::ClassList;
pub use document::Document;
pub use observer::{
    MutationObserverInit, MutationObservers, MutationRecord, MutationType, ObserverId,
};
pub use operations::{DomError, DomResult};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);
    
    /// Check if this ID refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }
    
    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
