//! Computed Style
//!
//! Only the properties the cascade has seen are stored; everything else
//! reports its initial value through the accessors.

use std::collections::HashMap;

/// Image-producing CSS functions
const IMAGE_FUNCTIONS: &[&str] = &[
    "url",
    "image",
    "image-set",
    "-webkit-image-set",
    "cross-fade",
    "element",
    "paint",
];

/// Computed style for one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    properties: HashMap<String, String>,
}

impl ComputedStyle {
    /// Raw computed value of a property, if any rule set it
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(|s| s.as_str())
    }
    
    /// Computed `background-image`; `none` when unset
    pub fn background_image(&self) -> &str {
        self.get("background-image").unwrap_or("none")
    }
    
    /// True when `background-image` holds at least one image
    pub fn has_background_image(&self) -> bool {
        let value = self.background_image().trim();
        !value.is_empty() && !value.eq_ignore_ascii_case("none")
    }
    
    /// Computed `filter`; `none` when unset
    pub fn filter(&self) -> &str {
        self.get("filter").unwrap_or("none")
    }
    
    /// Apply a declaration, expanding the `background` shorthand
    pub(crate) fn set(&mut self, property: &str, value: &str) {
        if property == "background" {
            let images = extract_images(value);
            let image = if images.is_empty() { "none".to_string() } else { images.join(", ") };
            self.properties.insert("background-image".to_string(), image);
        }
        self.properties.insert(property.to_string(), value.to_string());
    }
}

/// Pull the image functions (`url(...)`, gradients, ...) out of a value
pub fn extract_images(value: &str) -> Vec<&str> {
    let mut images = Vec::new();
    let bytes = value.as_bytes();
    let mut pos = 0;
    
    while let Some(offset) = value[pos..].find('(') {
        let open = pos + offset;
        let name_start = value[..open]
            .char_indices()
            .rev()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-'))
            .map_or(0, |(i, c)| i + c.len_utf8());
        let name = value[name_start..open].to_ascii_lowercase();
        
        let mut depth = 0usize;
        let mut close = None;
        let mut quote: Option<u8> = None;
        for (i, &b) in bytes.iter().enumerate().skip(open) {
            match (quote, b) {
                (Some(q), b) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'(') => depth += 1,
                (None, b')') => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(close) = close else {
            break;
        };
        
        if IMAGE_FUNCTIONS.contains(&name.as_str()) || name.ends_with("gradient") {
            images.push(&value[name_start..=close]);
        }
        pos = close + 1;
    }
    images
}
