//! Restoration Engine
//!
//! Marks elements whose live computed `background-image` is set so the
//! stylesheet can counter-invert them. Native media tags are covered by the
//! static selector and never marked. Marks are only taken off by `cleanup`,
//! which also reaches elements detached while marked.

use vibe_css::StyleResolver;
use vibe_dom::{Document, NodeId};

use crate::stylesheet::{NATIVE_MEDIA_TAGS, StealthToken};

/// Classifies and tags elements needing counter-inversion
#[derive(Debug, Clone)]
pub struct RestorationEngine {
    class: String,
}

impl RestorationEngine {
    pub fn new(token: &StealthToken) -> Self {
        Self {
            class: token.restore_class(),
        }
    }
    
    /// The restoration mark class
    pub fn class(&self) -> &str {
        &self.class
    }
    
    pub fn is_marked(&self, doc: &Document, node: NodeId) -> bool {
        doc.has_class(node, &self.class)
    }
    
    /// Analyze a single node; returns true if it was marked by this call
    pub fn analyze(&self, doc: &mut Document, node: NodeId) -> bool {
        let resolver = StyleResolver::for_document(doc);
        self.analyze_with(doc, &resolver, node)
    }
    
    /// Analyze against an already collected set of stylesheets
    pub fn analyze_with(&self, doc: &mut Document, resolver: &StyleResolver, node: NodeId) -> bool {
        if !self.needs_mark(doc, resolver, node) {
            return false;
        }
        match doc.add_class(node, &self.class) {
            Ok(added) => added,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", node, e);
                false
            }
        }
    }
    
    fn needs_mark(&self, doc: &Document, resolver: &StyleResolver, node: NodeId) -> bool {
        if !doc.is_element(node) || self.is_marked(doc, node) || !doc.is_connected(node) {
            return false;
        }
        if doc.tag_name(node).is_some_and(|tag| NATIVE_MEDIA_TAGS.contains(&tag)) {
            return false;
        }
        // None here means the node went away since the checks above
        resolver.compute_style(doc, node)
            .is_some_and(|style| style.has_background_image())
    }
    
    /// Analyze `root` and every descendant element; returns how many got marked
    pub fn scan_tree(&self, doc: &mut Document, root: NodeId) -> usize {
        let resolver = StyleResolver::for_document(doc);
        self.scan_tree_with(doc, &resolver, root)
    }
    
    pub fn scan_tree_with(&self, doc: &mut Document, resolver: &StyleResolver, root: NodeId) -> usize {
        let nodes: Vec<NodeId> = std::iter::once(root)
            .chain(doc.tree().descendants(root).map(|(id, _)| id))
            .filter(|id| doc.is_element(*id))
            .collect();
        let marked = nodes.into_iter()
            .filter(|node| self.analyze_with(doc, resolver, *node))
            .count();
        if marked > 0 {
            tracing::debug!("Marked {} element(s) under {}", marked, root);
        }
        marked
    }
    
    /// Remove the mark from every element of the document, including
    /// elements detached while marked
    pub fn cleanup(&self, doc: &mut Document) -> usize {
        let marked = doc.all_elements_with_class(&self.class);
        let mut removed = 0;
        for node in marked {
            match doc.remove_class(node, &self.class) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => tracing::debug!("Skipping {}: {}", node, e),
            }
        }
        if removed > 0 {
            tracing::debug!("Cleared {} restoration mark(s)", removed);
        }
        removed
    }
}
