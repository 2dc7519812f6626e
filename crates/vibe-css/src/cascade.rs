//! Style Cascade & Resolver
//!
//! Computes the final styles for DOM elements by:
//! 1. Matching selectors against elements
//! 2. Sorting by importance, inline origin, specificity and source order
//! 3. Applying declarations in that order

use crate::computed::ComputedStyle;
use crate::{CssParser, Declaration, Specificity, Stylesheet};
use vibe_dom::{Document, NodeId};

/// Cascade position of a declaration; later wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Weight {
    important: bool,
    inline: bool,
    specificity: Specificity,
    order: (usize, usize),
}

/// Style resolver - computes styles for DOM elements
#[derive(Debug, Default)]
pub struct StyleResolver {
    /// Author stylesheets (page CSS), in document order
    author_styles: Vec<Stylesheet>,
}

impl StyleResolver {
    /// Resolver without any stylesheet (inline styles only)
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Resolver for the `<style>` elements currently attached to `doc`
    pub fn for_document(doc: &Document) -> Self {
        let parser = CssParser::new();
        let mut resolver = Self::new();
        for style in doc.elements_by_tag_name("style") {
            let css = doc.text_content(style);
            match parser.parse(&css) {
                Ok(sheet) => resolver.add_stylesheet(sheet),
                Err(e) => tracing::warn!("CSS parse error in <style> {}: {}", style, e),
            }
        }
        tracing::trace!("collected {} stylesheets", resolver.author_styles.len());
        resolver
    }
    
    /// Add an author stylesheet
    pub fn add_stylesheet(&mut self, stylesheet: Stylesheet) {
        self.author_styles.push(stylesheet);
    }
    
    /// Number of author stylesheets
    pub fn stylesheet_count(&self) -> usize {
        self.author_styles.len()
    }
    
    /// Compute styles for an attached element; `None` for anything else
    pub fn compute_style(&self, doc: &Document, node_id: NodeId) -> Option<ComputedStyle> {
        if !doc.is_element(node_id) || !doc.is_connected(node_id) {
            return None;
        }
        
        let tree = doc.tree();
        let mut matches: Vec<(&Declaration, Weight)> = Vec::new();
        for (sheet_idx, sheet) in self.author_styles.iter().enumerate() {
            for (rule_idx, rule) in sheet.rules.iter().enumerate() {
                let specificity = rule.selectors.iter()
                    .filter(|s| s.matches(tree, node_id))
                    .map(|s| s.specificity)
                    .max();
                let Some(specificity) = specificity else {
                    continue;
                };
                for decl in &rule.declarations {
                    matches.push((decl, Weight {
                        important: decl.important,
                        inline: false,
                        specificity,
                        order: (sheet_idx, rule_idx),
                    }));
                }
            }
        }
        
        let inline = doc.get_attribute(node_id, "style")
            .map(|style| match CssParser::new().parse_declarations(style) {
                Ok(decls) => decls,
                Err(e) => {
                    tracing::debug!("ignoring bad inline style on {}: {}", node_id, e);
                    Vec::new()
                }
            })
            .unwrap_or_default();
        for decl in &inline {
            matches.push((decl, Weight {
                important: decl.important,
                inline: true,
                specificity: Specificity::default(),
                order: (usize::MAX, 0),
            }));
        }
        
        // Stable sort keeps declaration order within one rule
        matches.sort_by_key(|(_, weight)| *weight);
        
        let mut style = ComputedStyle::default();
        for (decl, _) in matches {
            style.set(&decl.property, &decl.value);
        }
        
        match style.background_image().to_ascii_lowercase().as_str() {
            "inherit" => {
                let parent = tree.get(node_id).map_or(NodeId::NONE, |n| n.parent);
                let inherited = self.compute_style(doc, parent)
                    .map_or_else(|| "none".to_string(), |p| p.background_image().to_string());
                style.set("background-image", &inherited);
            }
            "initial" | "unset" | "revert" => style.set("background-image", "none"),
            _ => {}
        }
        
        Some(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_stylesheet;
    
    fn doc_with_div() -> (Document, NodeId) {
        let mut doc = Document::default();
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        (doc, div)
    }
    
    #[test]
    fn test_inline_background_image() {
        let (mut doc, div) = doc_with_div();
        doc.set_attribute(div, "style", "background-image: url(x.png)").unwrap();
        let style = StyleResolver::new().compute_style(&doc, div).unwrap();
        assert!(style.has_background_image());
    }
    
    #[test]
    fn test_stylesheet_rule_applies() {
        let (mut doc, div) = doc_with_div();
        doc.add_class(div, "hero").unwrap();
        let mut resolver = StyleResolver::new();
        resolver.add_stylesheet(parse_stylesheet(".hero { background: url(h.jpg) no-repeat; }").unwrap());
        let style = resolver.compute_style(&doc, div).unwrap();
        assert!(style.background_image().contains("h.jpg"));
    }
    
    #[test]
    fn test_specificity_beats_order() {
        let (mut doc, div) = doc_with_div();
        doc.set_attribute(div, "id", "main").unwrap();
        let mut resolver = StyleResolver::new();
        resolver.add_stylesheet(parse_stylesheet(
            "#main { background-image: url(a.png); } div { background-image: none; }",
        ).unwrap());
        assert!(resolver.compute_style(&doc, div).unwrap().has_background_image());
    }
    
    #[test]
    fn test_important_beats_inline() {
        let (mut doc, div) = doc_with_div();
        doc.set_attribute(div, "style", "background-image: url(a.png)").unwrap();
        let mut resolver = StyleResolver::new();
        resolver.add_stylesheet(parse_stylesheet("div { background-image: none !important; }").unwrap());
        assert!(!resolver.compute_style(&doc, div).unwrap().has_background_image());
    }
    
    #[test]
    fn test_detached_is_not_applicable() {
        let (mut doc, div) = doc_with_div();
        doc.remove(div).unwrap();
        assert!(StyleResolver::new().compute_style(&doc, div).is_none());
        let text = doc.create_text("x");
        assert!(StyleResolver::new().compute_style(&doc, text).is_none());
    }
    
    #[test]
    fn test_for_document_reads_style_elements() {
        let (mut doc, div) = doc_with_div();
        let head = doc.head().unwrap();
        let style = doc.create_element("style");
        doc.append_child(head, style).unwrap();
        doc.set_text_content(style, "body div { background-image: linear-gradient(red, blue); }").unwrap();
        
        let resolver = StyleResolver::for_document(&doc);
        assert_eq!(resolver.stylesheet_count(), 1);
        assert!(resolver.compute_style(&doc, div).unwrap().has_background_image());
    }
}
