//! Vibe HTML - HTML5 parsing
//!
//! Uses html5ever's RcDom and converts it into a `vibe_dom::Document`.

mod parser;

pub use parser::HtmlParser;

/// Parse an HTML document served from `url`
pub fn parse_document(html: &str, url: &str) -> vibe_dom::Document {
    HtmlParser::new().parse_with_url(html, url)
}
