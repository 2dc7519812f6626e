//! CSS Parser using lightningcss
//!
//! lightningcss builds the rule tree with error recovery on, so a broken
//! rule only loses itself. Style rules inside `@media`, `@supports` and
//! `@layer` blocks are flattened; other at-rules are skipped.

use crate::{CssError, Declaration, Rule, Selector, Stylesheet};
use lightningcss::declaration::DeclarationBlock;
use lightningcss::printer::PrinterOptions;
use lightningcss::properties::Property;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, StyleAttribute, StyleSheet};
use lightningcss::traits::ToCss;

/// CSS Parser
pub struct CssParser;

impl CssParser {
    pub fn new() -> Self {
        Self
    }
    
    /// Parse a CSS stylesheet
    pub fn parse(&self, css: &str) -> Result<Stylesheet, CssError> {
        let stylesheet = StyleSheet::parse(css, recovering()).map_err(|e| CssError::ParseError {
            line: e.loc.map_or(0, |l| l.line + 1),
            message: e.kind.to_string(),
        })?;
        
        let mut result = Stylesheet::new();
        self.collect_rules(&stylesheet.rules.0, &mut result);
        Ok(result)
    }
    
    fn collect_rules(&self, rules: &[CssRule<'_>], out: &mut Stylesheet) {
        for rule in rules {
            match rule {
                CssRule::Style(style_rule) => {
                    let selectors = match style_rule.selectors.to_css_string(PrinterOptions::default()) {
                        Ok(text) => Selector::parse_list(&text),
                        Err(e) => {
                            tracing::debug!("unprintable selector list: {}", e);
                            continue;
                        }
                    };
                    if selectors.is_empty() {
                        tracing::debug!("dropping rule without a supported selector");
                        continue;
                    }
                    out.rules.push(Rule {
                        selectors,
                        declarations: convert_declarations(&style_rule.declarations),
                    });
                }
                CssRule::Media(media) => self.collect_rules(&media.rules.0, out),
                CssRule::Supports(supports) => self.collect_rules(&supports.rules.0, out),
                CssRule::LayerBlock(layer) => self.collect_rules(&layer.rules.0, out),
                _ => tracing::trace!("skipping non-style rule"),
            }
        }
    }
    
    /// Parse a declaration block (`color: red; background: blue`)
    pub fn parse_declarations(&self, block: &str) -> Result<Vec<Declaration>, CssError> {
        let attr = StyleAttribute::parse(block, recovering()).map_err(|e| CssError::ParseError {
            line: e.loc.map_or(0, |l| l.line + 1),
            message: e.kind.to_string(),
        })?;
        Ok(convert_declarations(&attr.declarations))
    }
}

impl Default for CssParser {
    fn default() -> Self {
        Self::new()
    }
}

fn recovering<'i>() -> ParserOptions<'i> {
    ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    }
}

fn convert_declarations(block: &DeclarationBlock<'_>) -> Vec<Declaration> {
    let normal = block.declarations.iter().filter_map(|d| convert_declaration(d, false));
    let important = block.important_declarations.iter().filter_map(|d| convert_declaration(d, true));
    normal.chain(important).collect()
}

fn convert_declaration(decl: &Property, important: bool) -> Option<Declaration> {
    let property = decl.property_id().name().to_ascii_lowercase();
    let value = decl.value_to_css_string(PrinterOptions::default()).ok()?;
    Some(Declaration { property, value, important })
}
