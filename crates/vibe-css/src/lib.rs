//! Vibe CSS Parser & Style System
//!
//! Stylesheet parsing and a cascade that answers computed-style queries for
//! elements of a `vibe_dom::Document`. Stylesheets are parsed with
//! lightningcss; selectors are matched against the static state of the
//! tree, so dynamic pseudo-classes like `:hover` never match.

mod parser;
mod selectors;
mod cascade;
mod computed;

pub use parser::CssParser;
pub use selectors::{Selector, Compound, Combinator, AttrSelector, AttrOp, PseudoClass, Nth};
pub use cascade::StyleResolver;
pub use computed::{ComputedStyle, extract_images};

/// Parse a CSS stylesheet
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, CssError> {
    CssParser::new().parse(css)
}

/// Parse an inline `style` attribute
pub fn parse_declarations(style: &str) -> Result<Vec<Declaration>, CssError> {
    CssParser::new().parse_declarations(style)
}

/// Parsed stylesheet
#[derive(Debug, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Number of style rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// CSS rule
#[derive(Debug)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// Selector specificity (a, b, c)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl std::ops::Add for Specificity {
    type Output = Specificity;
    
    fn add(self, rhs: Specificity) -> Specificity {
        Specificity(self.0 + rhs.0, self.1 + rhs.1, self.2 + rhs.2)
    }
}

/// CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// CSS parsing error
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: u32, message: String },
}
