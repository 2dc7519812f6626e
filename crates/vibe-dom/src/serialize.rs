//! HTML serialization

use crate::{Document, NodeData, NodeId};

/// Elements that never have children or an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "source", "track", "wbr",
];

/// Elements whose text is emitted verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Document {
    /// Serialize the whole document
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for (id, _) in self.tree().children(NodeId::ROOT) {
            self.write_node(id, false, &mut out);
        }
        out
    }
    
    /// Serialize a node and its subtree
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, false, &mut out);
        out
    }
    
    fn write_node(&self, id: NodeId, raw: bool, out: &mut String) {
        let Some(node) = self.tree().get(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => {
                for (child, _) in self.tree().children(id) {
                    self.write_node(child, false, out);
                }
            }
            NodeData::Doctype { name } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Text(text) => {
                if raw {
                    out.push_str(text);
                } else {
                    escape_into(text, false, out);
                }
            }
            NodeData::Element(elem) => {
                out.push('<');
                out.push_str(&elem.name);
                for attr in &elem.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_into(&attr.value, true, out);
                    out.push('"');
                }
                out.push('>');
                
                if VOID_ELEMENTS.contains(&elem.name.as_str()) {
                    return;
                }
                let raw_children = RAW_TEXT_ELEMENTS.contains(&elem.name.as_str());
                for (child, _) in self.tree().children(id) {
                    self.write_node(child, raw_children, out);
                }
                out.push_str("</");
                out.push_str(&elem.name);
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_serialize_basic_structure() {
        let mut doc = Document::new("about:blank");
        let body = doc.body().unwrap();
        let p = doc.create_element("p");
        let text = doc.create_text("a < b");
        doc.append_child(body, p).unwrap();
        doc.append_child(p, text).unwrap();
        doc.add_class(p, "note").unwrap();
        
        assert_eq!(
            doc.to_html(),
            "<html><head></head><body><p class=\"note\">a &lt; b</p></body></html>"
        );
    }
    
    #[test]
    fn test_style_text_not_escaped() {
        let mut doc = Document::new("about:blank");
        let head = doc.head().unwrap();
        let style = doc.create_element("style");
        doc.append_child(head, style).unwrap();
        doc.set_text_content(style, "a > b { color: red }").unwrap();
        assert_eq!(doc.outer_html(style), "<style>a > b { color: red }</style>");
    }
    
    #[test]
    fn test_void_elements_have_no_end_tag() {
        let mut doc = Document::new("about:blank");
        let body = doc.body().unwrap();
        let img = doc.create_element("img");
        doc.set_attribute(img, "src", "x.png").unwrap();
        doc.append_child(body, img).unwrap();
        assert_eq!(doc.outer_html(img), "<img src=\"x.png\">");
    }
}
