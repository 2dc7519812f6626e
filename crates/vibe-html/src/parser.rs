//! HTML5 Parser implementation
//!
//! Uses html5ever's built-in RcDom and converts to our DOM format.
//! This is simpler and more reliable than implementing TreeSink directly.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use vibe_dom::{Document, DomTree, NodeId};

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }
    
    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }
    
    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);
        
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        
        let mut document = Document::empty(url);
        self.convert_node(&dom.document, document.tree_mut(), NodeId::ROOT);
        document.finalize();
        
        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }
    
    /// Convert an RcDom node (and its children) under `parent`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) {
        let id = match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
                return;
            }
            RcNodeData::Doctype { name, .. } => tree.create_doctype(name),
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if text.trim().is_empty() {
                    return;
                }
                tree.create_text(&text)
            }
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                if let Some(elem) = tree.get_mut(id).and_then(|n| n.as_element_mut()) {
                    for attr in attrs.borrow().iter() {
                        elem.set_attr(&attr.name.local, &attr.value);
                    }
                }
                id
            }
            RcNodeData::ProcessingInstruction { .. } => return,
        };
        
        if let Err(e) = tree.append_child(parent, id) {
            tracing::warn!("dropping node {}: {}", id, e);
            return;
        }
        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, id);
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html);
        
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
        assert_eq!(doc.elements_by_tag_name("p").len(), 1);
    }
    
    #[test]
    fn test_parse_fragment_gets_structure() {
        let doc = HtmlParser::new().parse("<div><span>Text</span></div>");
        assert!(doc.document_element().is_some());
        assert!(doc.body().is_some());
        assert_eq!(doc.elements_by_tag_name("span").len(), 1);
    }
    
    #[test]
    fn test_attributes_and_classes() {
        let html = r#"<div id="hero" class="a b" style="background-image: url(x.png)"></div>"#;
        let doc = HtmlParser::new().parse_with_url(html, "https://example.com/");
        let div = doc.get_element_by_id("hero").unwrap();
        assert!(doc.has_class(div, "b"));
        assert_eq!(doc.get_attribute(div, "style"), Some("background-image: url(x.png)"));
        assert_eq!(doc.url(), "https://example.com/");
    }
    
    #[test]
    fn test_doctype_and_style_text() {
        let html = "<!DOCTYPE html><html><head><style>p { color: red }</style></head><body></body></html>";
        let doc = HtmlParser::new().parse(html);
        assert_eq!(doc.doctype(), Some("html"));
        let style = doc.elements_by_tag_name("style")[0];
        assert_eq!(doc.text_content(style), "p { color: red }");
    }
}
