//! Document - High-level document API
//!
//! All mutating calls go through `Document` so that connected mutation
//! observers see them. `tree_mut` bypasses observers and is meant for bulk
//! construction (parsing) before any observer exists.

use crate::{
    DomError, DomResult, DomTree, MutationObserverInit, MutationObservers, MutationRecord,
    NodeData, NodeId, ObserverId,
};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Document URL
    url: String,
    /// Connected mutation observers
    observers: MutationObservers,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a document with the basic html/head/body structure
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let tree = &mut doc.tree;
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        
        // Fresh nodes under containers cannot fail
        let _ = tree.append_child(NodeId::ROOT, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);
        
        doc.html_element = html;
        doc.head_element = head;
        doc.body_element = body;
        doc
    }
    
    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            observers: MutationObservers::new(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }
    
    /// Locate html/head/body after bulk construction
    pub fn finalize(&mut self) {
        self.html_element = self.tree.children(NodeId::ROOT)
            .find(|(_, n)| n.as_element().is_some_and(|e| e.name == "html"))
            .map_or(NodeId::NONE, |(id, _)| id);
        
        self.head_element = NodeId::NONE;
        self.body_element = NodeId::NONE;
        if self.html_element.is_valid() {
            for (id, node) in self.tree.children(self.html_element) {
                match node.as_element().map(|e| e.name.as_str()) {
                    Some("head") if !self.head_element.is_valid() => self.head_element = id,
                    Some("body") if !self.body_element.is_valid() => self.body_element = id,
                    _ => {}
                }
            }
        }
    }
    
    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }
    
    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }
    
    /// Access the DOM tree mutably (not observed)
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
    
    fn attached(&self, id: NodeId) -> Option<NodeId> {
        (id.is_valid() && self.tree.is_connected(id)).then_some(id)
    }
    
    /// Get <html> element, if attached
    pub fn document_element(&self) -> Option<NodeId> {
        self.attached(self.html_element)
    }
    
    /// Get <head> element, if attached
    pub fn head(&self) -> Option<NodeId> {
        self.attached(self.head_element)
    }
    
    /// Get <body> element, if attached
    pub fn body(&self) -> Option<NodeId> {
        self.attached(self.body_element)
    }
    
    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }
    
    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }
    
    /// Check whether a node is attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.tree.is_connected(id)
    }
    
    /// Check whether a node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.tree.get(id).is_some_and(|n| n.is_element())
    }
    
    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.get(id)?.as_element().map(|e| e.name.as_str())
    }
    
    fn notify(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        let tree = &self.tree;
        self.observers.notify(record, |a, b| tree.is_inclusive_ancestor(a, b));
    }
    
    /// Insert `child` before `reference` (append if `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        let old_parent = self.tree.get(child).ok_or(DomError::NotFound(child))?.parent;
        self.tree.insert_before(parent, child, reference)?;
        
        if old_parent.is_valid() {
            self.notify(MutationRecord::child_list(old_parent, Vec::new(), vec![child]));
        }
        self.notify(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(())
    }
    
    /// Append a child node
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }
    
    /// Detach a node from its parent
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        let parent = self.tree.get(id).ok_or(DomError::NotFound(id))?.parent;
        if !parent.is_valid() {
            return Ok(());
        }
        self.tree.detach(id)?;
        self.notify(MutationRecord::child_list(parent, Vec::new(), vec![id]));
        Ok(())
    }
    
    /// Get an attribute value
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.get(id)?.as_element()?.get_attr(name)
    }
    
    /// Set an attribute
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let elem = self.element_mut(id)?;
        let old = elem.set_attr(name, value);
        self.notify(MutationRecord::attribute(id, &name.to_ascii_lowercase(), old));
        Ok(())
    }
    
    /// Remove an attribute
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        let elem = self.element_mut(id)?;
        if let Some(old) = elem.remove_attr(name) {
            self.notify(MutationRecord::attribute(id, name, Some(old)));
        }
        Ok(())
    }
    
    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut crate::ElementData> {
        self.tree.get_mut(id)
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }
    
    /// Check for a class token
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.tree.get(id)
            .and_then(|n| n.as_element())
            .is_some_and(|e| e.has_class(class))
    }
    
    /// Add a class token; returns true if it was added
    pub fn add_class(&mut self, id: NodeId, class: &str) -> DomResult<bool> {
        match self.element_mut(id)?.add_class(class) {
            Some(old) => {
                self.notify(MutationRecord::attribute(id, "class", old));
                Ok(true)
            }
            None => Ok(false),
        }
    }
    
    /// Remove a class token; returns true if it was removed
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> DomResult<bool> {
        match self.element_mut(id)?.remove_class(class) {
            Some(old) => {
                self.notify(MutationRecord::attribute(id, "class", old));
                Ok(true)
            }
            None => Ok(false),
        }
    }
    
    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.tree.get(id).and_then(|n| n.as_text()) {
            return text.to_string();
        }
        self.tree.descendants(id)
            .filter_map(|(_, n)| n.as_text())
            .collect()
    }
    
    /// Replace all children of an element with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        if !self.is_element(id) {
            return Err(DomError::NotAnElement(id));
        }
        let removed: Vec<NodeId> = self.tree.children(id).map(|(child, _)| child).collect();
        for child in &removed {
            self.tree.detach(*child)?;
        }
        let mut added = Vec::new();
        if !text.is_empty() {
            let node = self.tree.create_text(text);
            self.tree.append_child(id, node)?;
            added.push(node);
        }
        if !added.is_empty() || !removed.is_empty() {
            self.notify(MutationRecord::child_list(id, added, removed));
        }
        Ok(())
    }
    
    /// Attached elements in document order
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tree.descendants(NodeId::ROOT)
            .filter(|(_, n)| n.is_element())
            .map(|(id, _)| id)
    }
    
    /// Get element by ID (first attached match)
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(NodeId::ROOT)
            .find(|(_, n)| n.as_element().is_some_and(|e| e.id.as_deref() == Some(id)))
            .map(|(node_id, _)| node_id)
    }
    
    /// Attached elements carrying a class, in document order
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.tree.descendants(NodeId::ROOT)
            .filter(|(_, n)| n.as_element().is_some_and(|e| e.has_class(class)))
            .map(|(id, _)| id)
            .collect()
    }
    
    /// Elements carrying a class, including detached ones, in creation order
    pub fn all_elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.tree.node_ids()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }
    
    /// Attached elements with a tag name, in document order
    pub fn elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.tree.descendants(NodeId::ROOT)
            .filter(|(_, n)| n.as_element().is_some_and(|e| e.name == tag))
            .map(|(id, _)| id)
            .collect()
    }
    
    /// Doctype name, if any
    pub fn doctype(&self) -> Option<&str> {
        self.tree.children(NodeId::ROOT).find_map(|(_, n)| match &n.data {
            NodeData::Doctype { name } => Some(name.as_str()),
            _ => None,
        })
    }
    
    /// Start observing `target`
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        tracing::trace!("observer attached to {}", target);
        self.observers.observe(target, options)
    }
    
    /// Disconnect an observer
    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.observers.disconnect(observer)
    }
    
    /// Take queued mutation records for an observer
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(observer)
    }
    
    /// Connected observers
    pub fn observers(&self) -> &MutationObservers {
        &self.observers
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
