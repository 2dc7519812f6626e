//! Stylesheet Manager
//!
//! Owns the single injected `<style>` element. Its text is regenerated in
//! full on every apply; ids and class names carry the per-page token.

use rand::Rng;
use vibe_dom::{Document, DomResult, NodeId};

use crate::config::Warmth;

/// Tags covered by the static counter-inversion selector
pub const NATIVE_MEDIA_TAGS: &[&str] = &["img", "video", "iframe"];

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 8;

/// Random suffix generated once per page load
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StealthToken(String);

impl StealthToken {
    /// Fresh 8-character base-36 token
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token = (0..TOKEN_LEN)
            .map(|_| char::from(TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())]))
            .collect();
        Self(token)
    }
    
    /// Fixed token, for reproducible output
    pub fn from_raw(token: impl Into<String>) -> Self {
        Self(token.into())
    }
    
    pub fn as_str(&self) -> &str {
        &self.0
    }
    
    /// Id of the injected style element
    pub fn style_id(&self) -> String {
        format!("style-{}", self.0)
    }
    
    /// Class name of the restoration mark
    pub fn restore_class(&self) -> String {
        format!("restore-{}", self.0)
    }
}

/// Injects, updates and removes the theme stylesheet
#[derive(Debug, Clone)]
pub struct StylesheetManager {
    style_id: String,
    restore_class: String,
}

impl StylesheetManager {
    pub fn new(token: &StealthToken) -> Self {
        Self {
            style_id: token.style_id(),
            restore_class: token.restore_class(),
        }
    }
    
    pub fn style_id(&self) -> &str {
        &self.style_id
    }
    
    /// Generate the theme CSS for a warmth value
    pub fn css_rules(&self, warmth: Warmth) -> String {
        let filter = format!(
            "invert(1) hue-rotate(180deg) contrast(0.8) sepia({})",
            warmth.sepia()
        );
        format!(
            "html {{\n  background-color: #1a1a1a !important;\n  filter: {filter} !important;\n}}\n\
             {media}, .{class} {{\n  filter: invert(1) hue-rotate(180deg) !important;\n}}\n",
            media = NATIVE_MEDIA_TAGS.join(", "),
            class = self.restore_class,
        )
    }
    
    /// The attached style element, if present
    pub fn style_element(&self, doc: &Document) -> Option<NodeId> {
        doc.get_element_by_id(&self.style_id)
    }
    
    pub fn is_applied(&self, doc: &Document) -> bool {
        self.style_element(doc).is_some()
    }
    
    /// Inject the stylesheet, or rewrite it in place if already present
    pub fn apply(&self, doc: &mut Document, warmth: Warmth) -> DomResult<NodeId> {
        let css = self.css_rules(warmth);
        let style = match self.style_element(doc) {
            Some(style) => style,
            None => {
                let style = doc.create_element("style");
                doc.set_attribute(style, "id", &self.style_id)?;
                let parent = doc.head()
                    .or_else(|| doc.document_element())
                    .unwrap_or(NodeId::ROOT);
                doc.append_child(parent, style)?;
                tracing::debug!("Injected stylesheet {} under {}", self.style_id, parent);
                style
            }
        };
        if doc.text_content(style) != css {
            doc.set_text_content(style, &css)?;
        }
        Ok(style)
    }
    
    /// Remove the stylesheet; returns false if there was none
    pub fn remove(&self, doc: &mut Document) -> bool {
        let Some(style) = self.style_element(doc) else {
            return false;
        };
        match doc.remove(style) {
            Ok(()) => {
                tracing::debug!("Removed stylesheet {}", self.style_id);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to remove stylesheet {}: {}", self.style_id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    fn manager() -> StylesheetManager {
        StylesheetManager::new(&StealthToken::from_raw("abc12345"))
    }
    
    #[test]
    fn test_token_shape() {
        let token = StealthToken::generate();
        assert_eq!(token.as_str().len(), 8);
        assert!(token.as_str().bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
        assert_eq!(token.style_id(), format!("style-{}", token.as_str()));
        assert_eq!(token.restore_class(), format!("restore-{}", token.as_str()));
    }
    
    #[test]
    fn test_tokens_differ() {
        assert_ne!(StealthToken::generate(), StealthToken::generate());
    }
    
    #[test]
    fn test_sepia_component() {
        let css = manager().css_rules(Warmth::new(30));
        assert!(css.contains("sepia(0.3)"));
        assert!(manager().css_rules(Warmth::new(0)).contains("sepia(0)"));
        assert!(manager().css_rules(Warmth::new(100)).contains("sepia(1)"));
        assert!(manager().css_rules(Warmth::new(7)).contains("sepia(0.07)"));
    }
    
    #[test]
    fn test_css_shape() {
        let css = manager().css_rules(Warmth::new(0));
        assert!(css.contains("background-color: #1a1a1a !important"));
        assert!(css.contains("contrast(0.8)"));
        assert!(css.contains("img, video, iframe, .restore-abc12345 {"));
        // the counter filter carries neither sepia nor contrast
        let counter = css.split("iframe").nth(1).unwrap_or_default();
        assert!(!counter.contains("sepia"));
        assert!(!counter.contains("contrast"));
    }
    
    #[test]
    fn test_apply_into_head() {
        let mut doc = Document::new("https://a.com/");
        let style = manager().apply(&mut doc, Warmth::new(10)).unwrap();
        assert_eq!(doc.tree().get(style).map(|n| n.parent), doc.head());
        assert!(manager().is_applied(&doc));
    }
    
    #[test]
    fn test_apply_without_head() {
        let mut doc = Document::empty("https://a.com/");
        let html = doc.create_element("html");
        doc.append_child(NodeId::ROOT, html).unwrap();
        doc.finalize();
        let style = manager().apply(&mut doc, Warmth::new(10)).unwrap();
        assert_eq!(doc.tree().get(style).map(|n| n.parent), Some(html));
    }
    
    #[test]
    fn test_apply_idempotent() {
        let mut doc = Document::new("https://a.com/");
        let m = manager();
        let first = m.apply(&mut doc, Warmth::new(40)).unwrap();
        let text = doc.text_content(first);
        let second = m.apply(&mut doc, Warmth::new(40)).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.elements_by_tag_name("style").len(), 1);
        assert_eq!(doc.text_content(second), text);
    }
    
    #[test]
    fn test_apply_updates_content() {
        let mut doc = Document::new("https://a.com/");
        let m = manager();
        m.apply(&mut doc, Warmth::new(40)).unwrap();
        let style = m.apply(&mut doc, Warmth::new(90)).unwrap();
        assert!(doc.text_content(style).contains("sepia(0.9)"));
        assert_eq!(doc.elements_by_tag_name("style").len(), 1);
    }
    
    #[test]
    fn test_remove_noop() {
        let mut doc = Document::new("https://a.com/");
        let m = manager();
        assert!(!m.remove(&mut doc));
        m.apply(&mut doc, Warmth::new(0)).unwrap();
        assert!(m.remove(&mut doc));
        assert!(!m.is_applied(&doc));
        assert!(!m.remove(&mut doc));
    }
}
