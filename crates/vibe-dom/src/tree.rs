//! DOM Tree (arena-based allocation)

use crate::{DomError, DomResult, Node, NodeId};

/// Arena-based DOM tree; index 0 is always the document node
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }
    
    /// Document node ID
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }
    
    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }
    
    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }
    
    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    
    /// Check if tree holds only the document node
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
    
    /// Every node id in the arena, attached or detached, in creation order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }
    
    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }
    
    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }
    
    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }
    
    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }
    
    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node {
            data: crate::NodeData::Doctype { name: name.to_string() },
            ..Node::comment("")
        })
    }
    
    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }
    
    /// Check whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current) {
                Some(n) => n.parent,
                None => return false,
            };
        }
        false
    }
    
    /// Check whether a node is attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.is_inclusive_ancestor(NodeId::ROOT, id)
    }
    
    /// Detach a node from its parent; no-op if already detached
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node(id)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(());
        }
        
        match self.get_mut(prev) {
            Some(p) => p.next_sibling = next,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = next;
                }
            }
        }
        match self.get_mut(next) {
            Some(n) => n.prev_sibling = prev,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = prev;
                }
            }
        }
        
        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
        Ok(())
    }
    
    /// Insert `child` into `parent` before `reference` (append if `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        if !self.node(parent)?.is_container() || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.node(child)?;
        if let Some(r) = reference {
            if self.node(r)?.parent != parent {
                return Err(DomError::NotAChild { parent, child: r });
            }
            if r == child {
                return Ok(());
            }
        }
        
        self.detach(child)?;
        
        let prev = match reference {
            Some(r) => self.node(r)?.prev_sibling,
            None => self.node(parent)?.last_child,
        };
        let next = reference.unwrap_or(NodeId::NONE);
        
        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        match self.get_mut(prev) {
            Some(p) => p.next_sibling = child,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = child;
                }
            }
        }
        match self.get_mut(next) {
            Some(n) => n.prev_sibling = child,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = child;
                }
            }
        }
        Ok(())
    }
    
    /// Append a child node
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }
    
    /// Iterate over direct children
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        let first = self.get(parent).map_or(NodeId::NONE, |n| n.first_child);
        std::iter::successors(
            self.get(first).map(|n| (first, n)),
            move |(_, node)| self.get(node.next_sibling).map(|n| (node.next_sibling, n)),
        )
    }
    
    /// Pre-order iterator over the descendants of `root` (excluding `root`)
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root,
            next: self.get(root).map_or(NodeId::NONE, |n| n.first_child),
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Document-order walk over a subtree
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeId, &'a Node);
    
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next;
        let node = self.tree.get(current)?;
        
        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            // Climb until a next sibling exists, stopping at the subtree root
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cursor) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
                if cursor == self.root || !cursor.is_valid() {
                    break NodeId::NONE;
                }
            }
        };
        Some((current, node))
    }
}
