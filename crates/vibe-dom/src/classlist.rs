//! DOMTokenList (classList)
//!
//! Ordered, duplicate-free set of class tokens.

/// Token list for an element's `class` attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    /// Create empty token list
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Parse from space-separated string
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        for token in s.split_whitespace() {
            list.add(token);
        }
        list
    }
    
    /// Get number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
    
    /// Check if list is empty
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
    
    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
    
    /// Add a token, returns true if it was not present
    pub fn add(&mut self, token: &str) -> bool {
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }
    
    /// Remove a token, returns true if it was present
    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        self.tokens.len() != before
    }
    
    /// Toggle token, returns new state
    pub fn toggle(&mut self, token: &str) -> bool {
        if self.remove(token) {
            false
        } else {
            self.add(token)
        }
    }
    
    /// Get value as string
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }
    
    /// Iterate over tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}

impl std::fmt::Display for ClassList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_from_string_dedups() {
        let list = ClassList::from_string("btn  btn-primary btn");
        assert_eq!(list.len(), 2);
        assert!(list.contains("btn"));
        assert!(list.contains("btn-primary"));
    }
    
    #[test]
    fn test_add_remove() {
        let mut list = ClassList::new();
        assert!(list.add("foo"));
        assert!(!list.add("foo"));
        assert!(!list.add(""));
        assert!(list.remove("foo"));
        assert!(!list.remove("foo"));
        assert!(list.is_empty());
    }
    
    #[test]
    fn test_toggle() {
        let mut list = ClassList::new();
        assert!(list.toggle("active"));
        assert!(!list.toggle("active"));
        assert!(!list.contains("active"));
    }
    
    #[test]
    fn test_value_preserves_order() {
        let mut list = ClassList::from_string("a b");
        list.add("c");
        list.remove("a");
        assert_eq!(list.value(), "b c");
    }
}
