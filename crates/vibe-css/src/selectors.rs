//! CSS Selectors
//!
//! Parsing and right-to-left matching for complex selectors: compounds of
//! type, class, id, attribute and pseudo-class tests joined by descendant,
//! child and sibling combinators. Matching sees the tree as it is, so
//! user-interaction states never match. Pseudo-elements and unknown
//! pseudo-classes make a selector unsupported.

use crate::Specificity;
use vibe_dom::{DomTree, ElementData, NodeId};

/// Pseudo-classes that depend on user interaction
const DYNAMIC_PSEUDO_CLASSES: &[&str] = &[
    "hover",
    "active",
    "focus",
    "focus-within",
    "focus-visible",
    "visited",
    "target",
    "target-within",
];

/// Selector combinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant (whitespace)
    Descendant,
    /// Child (>)
    Child,
    /// Next sibling (+)
    NextSibling,
    /// Subsequent sibling (~)
    SubsequentSibling,
}

/// Attribute selector operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// [attr=value]
    Equals,
    /// [attr~=value]
    Includes,
    /// [attr|=value]
    DashMatch,
    /// [attr^=value]
    Prefix,
    /// [attr$=value]
    Suffix,
    /// [attr*=value]
    Substring,
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSelector {
    pub name: String,
    pub test: Option<(AttrOp, String)>,
}

impl AttrSelector {
    fn matches(&self, elem: &ElementData) -> bool {
        let Some(actual) = elem.get_attr(&self.name) else {
            return false;
        };
        let Some((op, expected)) = &self.test else {
            return true;
        };
        let expected = expected.as_str();
        match op {
            AttrOp::Equals => actual == expected,
            AttrOp::Includes => actual.split_whitespace().any(|t| t == expected),
            AttrOp::DashMatch => {
                actual == expected
                    || actual.strip_prefix(expected).is_some_and(|rest| rest.starts_with('-'))
            }
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
            AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}

/// `An+B` position pattern of the `:nth-*` pseudo-classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    pub a: i32,
    pub b: i32,
}

impl Nth {
    /// Parse `odd`, `even`, `B`, `An`, `An+B` (whitespace ignored)
    pub fn parse(text: &str) -> Option<Nth> {
        let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let text = text.to_ascii_lowercase();
        match text.as_str() {
            "odd" => return Some(Nth { a: 2, b: 1 }),
            "even" => return Some(Nth { a: 2, b: 0 }),
            _ => {}
        }
        let Some((a, b)) = text.split_once('n') else {
            return Some(Nth { a: 0, b: text.parse().ok()? });
        };
        let a = match a {
            "" | "+" => 1,
            "-" => -1,
            a => a.parse().ok()?,
        };
        let b = match b {
            "" => 0,
            b if b.starts_with(['+', '-']) => b.parse().ok()?,
            _ => return None,
        };
        Some(Nth { a, b })
    }
    
    /// Whether the 1-based `index` is `a*n + b` for some `n >= 0`
    pub fn matches(&self, index: usize) -> bool {
        let index = index as i64;
        let (a, b) = (self.a as i64, self.b as i64);
        if a == 0 {
            return index == b;
        }
        let diff = index - b;
        diff % a == 0 && diff / a >= 0
    }
}

/// Pseudo-class test inside a compound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    /// `:link` / `:any-link`
    AnyLink,
    Not(Vec<Selector>),
    Is(Vec<Selector>),
    /// Like `Is` with zero specificity
    Where(Vec<Selector>),
    /// Interaction state such as `:hover`; never matches
    Dynamic(String),
}

impl PseudoClass {
    fn parse(name: &str, arg: Option<&str>) -> Option<PseudoClass> {
        let pseudo = match (name, arg) {
            ("root", None) => PseudoClass::Root,
            ("empty", None) => PseudoClass::Empty,
            ("first-child", None) => PseudoClass::FirstChild,
            ("last-child", None) => PseudoClass::LastChild,
            ("only-child", None) => PseudoClass::OnlyChild,
            ("first-of-type", None) => PseudoClass::FirstOfType,
            ("last-of-type", None) => PseudoClass::LastOfType,
            ("only-of-type", None) => PseudoClass::OnlyOfType,
            ("link" | "any-link", None) => PseudoClass::AnyLink,
            ("nth-child", Some(arg)) => PseudoClass::NthChild(Nth::parse(arg)?),
            ("nth-last-child", Some(arg)) => PseudoClass::NthLastChild(Nth::parse(arg)?),
            ("nth-of-type", Some(arg)) => PseudoClass::NthOfType(Nth::parse(arg)?),
            ("nth-last-of-type", Some(arg)) => PseudoClass::NthLastOfType(Nth::parse(arg)?),
            ("not", Some(arg)) => PseudoClass::Not(Selector::parse_strict(arg)?),
            ("is" | "matches" | "-webkit-any" | "-moz-any", Some(arg)) => {
                PseudoClass::Is(Selector::parse_list(arg))
            }
            ("where", Some(arg)) => PseudoClass::Where(Selector::parse_list(arg)),
            (name, None) if DYNAMIC_PSEUDO_CLASSES.contains(&name) => {
                PseudoClass::Dynamic(name.to_string())
            }
            _ => return None,
        };
        Some(pseudo)
    }
    
    fn matches(&self, tree: &DomTree, node: NodeId, elem: &ElementData) -> bool {
        let position = |same_type| sibling_position(tree, node, same_type);
        match self {
            PseudoClass::Root => tree.get(node).is_some_and(|n| n.parent == NodeId::ROOT),
            PseudoClass::Empty => tree.children(node).all(|(_, child)| {
                !child.is_element() && child.as_text().is_none_or(str::is_empty)
            }),
            PseudoClass::FirstChild => position(false).is_some_and(|(i, _)| i == 1),
            PseudoClass::LastChild => position(false).is_some_and(|(i, n)| i == n),
            PseudoClass::OnlyChild => position(false).is_some_and(|(_, n)| n == 1),
            PseudoClass::FirstOfType => position(true).is_some_and(|(i, _)| i == 1),
            PseudoClass::LastOfType => position(true).is_some_and(|(i, n)| i == n),
            PseudoClass::OnlyOfType => position(true).is_some_and(|(_, n)| n == 1),
            PseudoClass::NthChild(nth) => position(false).is_some_and(|(i, _)| nth.matches(i)),
            PseudoClass::NthLastChild(nth) => {
                position(false).is_some_and(|(i, n)| nth.matches(n - i + 1))
            }
            PseudoClass::NthOfType(nth) => position(true).is_some_and(|(i, _)| nth.matches(i)),
            PseudoClass::NthLastOfType(nth) => {
                position(true).is_some_and(|(i, n)| nth.matches(n - i + 1))
            }
            PseudoClass::AnyLink => {
                matches!(elem.name.as_str(), "a" | "area") && elem.get_attr("href").is_some()
            }
            PseudoClass::Not(list) => !list.iter().any(|s| s.matches(tree, node)),
            PseudoClass::Is(list) | PseudoClass::Where(list) => {
                list.iter().any(|s| s.matches(tree, node))
            }
            PseudoClass::Dynamic(_) => false,
        }
    }
    
    fn specificity(&self) -> Specificity {
        match self {
            PseudoClass::Not(list) | PseudoClass::Is(list) => list.iter()
                .map(|s| s.specificity)
                .max()
                .unwrap_or_default(),
            PseudoClass::Where(_) => Specificity::default(),
            _ => Specificity(0, 1, 0),
        }
    }
}

/// Compound selector (no combinators), e.g. `div.card#main[data-x]:first-child`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// Lowercase tag; `None` for universal
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrSelector>,
    pub pseudos: Vec<PseudoClass>,
}

impl Compound {
    /// Check a single element against this compound
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(elem) = tree.get(node).and_then(|n| n.as_element()) else {
            return false;
        };
        if self.tag.as_ref().is_some_and(|t| *t != elem.name) {
            return false;
        }
        if self.id.is_some() && self.id != elem.id {
            return false;
        }
        if !self.classes.iter().all(|c| elem.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| a.matches(elem))
            && self.pseudos.iter().all(|p| p.matches(tree, node, elem))
    }
    
    fn specificity(&self) -> Specificity {
        let own = Specificity(
            self.id.is_some() as u32,
            (self.classes.len() + self.attrs.len()) as u32,
            self.tag.is_some() as u32,
        );
        self.pseudos.iter().fold(own, |acc, p| acc + p.specificity())
    }
}

/// Complex selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Source text
    pub text: String,
    pub specificity: Specificity,
    /// Compounds left to right; each carries the combinator linking it to
    /// the previous compound (`None` for the first)
    pub parts: Vec<(Option<Combinator>, Compound)>,
}

impl Selector {
    /// Parse a comma-separated selector list, keeping the entries that parse
    pub fn parse_list(text: &str) -> Vec<Selector> {
        split_top_level(text, ',')
            .into_iter()
            .filter_map(|entry| {
                let parsed = Selector::parse(entry);
                if parsed.is_none() {
                    tracing::trace!("unsupported selector: {}", entry.trim());
                }
                parsed
            })
            .collect()
    }
    
    /// Parse a selector list where every entry must be supported
    pub fn parse_strict(text: &str) -> Option<Vec<Selector>> {
        let list: Option<Vec<Selector>> = split_top_level(text, ',')
            .into_iter()
            .map(Selector::parse)
            .collect();
        list.filter(|l| !l.is_empty())
    }
    
    /// Parse a single complex selector
    pub fn parse(text: &str) -> Option<Selector> {
        let text = text.trim();
        let mut cursor = Cursor::new(text);
        let mut parts: Vec<(Option<Combinator>, Compound)> = Vec::new();
        let mut pending: Option<Combinator> = None;
        
        loop {
            let had_space = cursor.skip_whitespace();
            let Some(c) = cursor.peek() else {
                break;
            };
            let explicit = match c {
                '>' => Some(Combinator::Child),
                '+' => Some(Combinator::NextSibling),
                '~' => Some(Combinator::SubsequentSibling),
                _ => None,
            };
            if let Some(combinator) = explicit {
                if parts.is_empty() || pending.is_some() {
                    return None;
                }
                cursor.bump();
                pending = Some(combinator);
                continue;
            }
            if had_space && pending.is_none() && !parts.is_empty() {
                pending = Some(Combinator::Descendant);
            }
            let compound = cursor.compound()?;
            let combinator = if parts.is_empty() {
                None
            } else {
                Some(pending.take().unwrap_or(Combinator::Descendant))
            };
            parts.push((combinator, compound));
        }
        
        if parts.is_empty() || pending.is_some() {
            return None;
        }
        
        let specificity = parts.iter()
            .fold(Specificity::default(), |acc, (_, c)| acc + c.specificity());
        Some(Selector {
            text: text.to_string(),
            specificity,
            parts,
        })
    }
    
    /// Check if this selector matches an element
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        !self.parts.is_empty() && self.matches_at(tree, self.parts.len() - 1, node)
    }
    
    fn matches_at(&self, tree: &DomTree, idx: usize, node: NodeId) -> bool {
        let (combinator, compound) = &self.parts[idx];
        if !compound.matches(tree, node) {
            return false;
        }
        let Some(combinator) = combinator else {
            return true;
        };
        
        let step: fn(&DomTree, NodeId) -> Option<NodeId> = match combinator {
            Combinator::Child | Combinator::Descendant => parent_element,
            Combinator::NextSibling | Combinator::SubsequentSibling => previous_element,
        };
        let mut candidate = step(tree, node);
        match combinator {
            Combinator::Child | Combinator::NextSibling => {
                candidate.is_some_and(|c| self.matches_at(tree, idx - 1, c))
            }
            Combinator::Descendant | Combinator::SubsequentSibling => {
                while let Some(c) = candidate {
                    if self.matches_at(tree, idx - 1, c) {
                        return true;
                    }
                    candidate = step(tree, c);
                }
                false
            }
        }
    }
}

fn parent_element(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let parent = tree.get(node)?.parent;
    tree.get(parent)?.is_element().then_some(parent)
}

fn previous_element(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    let mut cursor = tree.get(node)?.prev_sibling;
    while let Some(sibling) = tree.get(cursor) {
        if sibling.is_element() {
            return Some(cursor);
        }
        cursor = sibling.prev_sibling;
    }
    None
}

/// 1-based index of `node` among its element siblings and their count,
/// optionally restricted to siblings with the same tag
fn sibling_position(tree: &DomTree, node: NodeId, same_type: bool) -> Option<(usize, usize)> {
    let n = tree.get(node)?;
    let name = &n.as_element()?.name;
    tree.get(n.parent)?;
    
    let mut index = 0;
    let mut count = 0;
    for (id, sibling) in tree.children(n.parent) {
        let Some(elem) = sibling.as_element() else {
            continue;
        };
        if same_type && elem.name != *name {
            continue;
        }
        count += 1;
        if id == node {
            index = count;
        }
    }
    (index > 0).then_some((index, count))
}

/// Split on `sep` outside brackets, parentheses and quotes
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(text: &str) -> Self {
        Self { chars: text.chars().collect(), pos: 0 }
    }
    
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }
    
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }
    
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }
    
    fn ident(&mut self) -> Option<String> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                out.push(self.bump()?);
            } else if c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        (!out.is_empty()).then_some(out)
    }
    
    /// Contents of a `( ... )` group starting at the cursor
    fn parenthesized(&mut self) -> Option<String> {
        if self.bump()? != '(' {
            return None;
        }
        let mut out = String::new();
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        loop {
            let c = self.bump()?;
            match (quote, c) {
                (_, '\\') => {
                    out.push(c);
                    out.push(self.bump()?);
                    continue;
                }
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(out);
                    }
                }
                _ => {}
            }
            out.push(c);
        }
    }
    
    fn compound(&mut self) -> Option<Compound> {
        let mut compound = Compound::default();
        let mut first = true;
        while let Some(c) = self.peek() {
            match c {
                '*' if first => {
                    self.pos += 1;
                }
                '#' => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                '.' => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                '[' => {
                    self.pos += 1;
                    compound.attrs.push(self.attribute()?);
                }
                ':' => {
                    self.pos += 1;
                    // pseudo-elements never match an element's own style
                    if self.peek() == Some(':') {
                        return None;
                    }
                    let name = self.ident()?.to_ascii_lowercase();
                    let arg = if self.peek() == Some('(') {
                        Some(self.parenthesized()?)
                    } else {
                        None
                    };
                    compound.pseudos.push(PseudoClass::parse(&name, arg.as_deref())?);
                }
                c if first && (c.is_alphabetic() || c == '_' || c == '-' || c == '\\') => {
                    compound.tag = Some(self.ident()?.to_ascii_lowercase());
                }
                c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => break,
                _ => return None,
            }
            first = false;
        }
        (!first).then_some(compound)
    }
    
    fn attribute(&mut self) -> Option<AttrSelector> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        
        let op = match self.bump()? {
            ']' => return Some(AttrSelector { name, test: None }),
            '=' => AttrOp::Equals,
            c => {
                let op = match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Substring,
                    _ => return None,
                };
                if self.bump()? != '=' {
                    return None;
                }
                op
            }
        };
        
        self.skip_whitespace();
        let value = match self.peek()? {
            q @ ('"' | '\'') => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump()? {
                        '\\' => value.push(self.bump()?),
                        c if c == q => break,
                        c => value.push(c),
                    }
                }
                value
            }
            _ => self.ident()?,
        };
        self.skip_whitespace();
        (self.bump()? == ']').then_some(AttrSelector {
            name,
            test: Some((op, value)),
        })
    }
}
