//! DOM Node
//!
//! Nodes link to their relatives by `NodeId` instead of pointers, so the
//! whole tree lives in one `Vec` and ids stay valid after detachment.

use crate::{ClassList, NodeId};

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if root or detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }
    
    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }
    
    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(content.to_string()))
    }
    
    /// Create a new comment node
    pub fn comment(content: &str) -> Self {
        Self::with_data(NodeData::Comment(content.to_string()))
    }
    
    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }
    
    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }
    
    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }
    
    /// Check if this node may have children
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self.data, NodeData::Element(_) | NodeData::Document)
    }
    
    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }
    
    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }
    
    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype { name: String },
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Lowercase tag name
    pub name: String,
    /// Attributes in source order (includes `id` and `class`)
    pub attrs: Vec<Attribute>,
    /// Cached id attribute
    pub id: Option<String>,
    /// Cached class list, kept in sync with the `class` attribute
    pub classes: ClassList,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            name: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            id: None,
            classes: ClassList::new(),
        }
    }
    
    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
    
    /// Set an attribute, returning the previous value
    pub fn set_attr(&mut self, name: &str, value: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "id" => self.id = Some(value.to_string()),
            "class" => self.classes = ClassList::from_string(value),
            _ => {}
        }
        
        for attr in self.attrs.iter_mut() {
            if attr.name == name {
                return Some(std::mem::replace(&mut attr.value, value.to_string()));
            }
        }
        self.attrs.push(Attribute { name, value: value.to_string() });
        None
    }
    
    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        match name {
            "id" => self.id = None,
            "class" => self.classes = ClassList::new(),
            _ => {}
        }
        Some(self.attrs.remove(pos).value)
    }
    
    /// Check for a class token
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
    
    /// Add a class token; returns the old `class` value if it changed
    pub fn add_class(&mut self, class: &str) -> Option<Option<String>> {
        let old = self.get_attr("class").map(str::to_string);
        if !self.classes.add(class) {
            return None;
        }
        self.sync_class_attr();
        Some(old)
    }
    
    /// Remove a class token; returns the old `class` value if it changed
    pub fn remove_class(&mut self, class: &str) -> Option<Option<String>> {
        let old = self.get_attr("class").map(str::to_string);
        if !self.classes.remove(class) {
            return None;
        }
        self.sync_class_attr();
        Some(old)
    }
    
    fn sync_class_attr(&mut self) {
        let value = self.classes.value();
        match self.attrs.iter_mut().find(|a| a.name == "class") {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attribute { name: "class".to_string(), value }),
        }
    }
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_tag_is_lowercased() {
        let elem = ElementData::new("DIV");
        assert_eq!(elem.name, "div");
    }
    
    #[test]
    fn test_class_attr_stays_in_sync() {
        let mut elem = ElementData::new("div");
        elem.set_attr("class", "a b");
        assert!(elem.has_class("b"));
        
        assert_eq!(elem.add_class("c"), Some(Some("a b".to_string())));
        assert_eq!(elem.get_attr("class"), Some("a b c"));
        assert_eq!(elem.add_class("c"), None);
        
        elem.remove_class("a");
        assert_eq!(elem.get_attr("class"), Some("b c"));
    }
    
    #[test]
    fn test_set_attr_returns_previous() {
        let mut elem = ElementData::new("div");
        assert_eq!(elem.set_attr("id", "x"), None);
        assert_eq!(elem.set_attr("id", "y"), Some("x".to_string()));
        assert_eq!(elem.id.as_deref(), Some("y"));
        assert_eq!(elem.remove_attr("id"), Some("y".to_string()));
        assert!(elem.id.is_none());
    }
}
