//! Site identity
//!
//! Hostname of the page, used for exclusion matching.

use url::Url;

/// URL schemes the engine never touches
pub const RESTRICTED_SCHEMES: &[&str] = &["chrome", "edge", "about", "data", "view-source"];

/// Identity of the current page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteIdentity {
    hostname: Option<String>,
}

impl SiteIdentity {
    pub fn new(hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        Self {
            hostname: (!hostname.is_empty()).then_some(hostname),
        }
    }
    
    /// Derive from a page URL; unparseable or host-less URLs have no hostname
    pub fn from_url(url: &str) -> Self {
        let hostname = match Url::parse(url) {
            Ok(u) => u.host_str().filter(|h| !h.is_empty()).map(str::to_string),
            Err(e) => {
                tracing::debug!("No site identity for {:?}: {}", url, e);
                None
            }
        };
        Self { hostname }
    }
    
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }
}

/// Check if a URL uses a scheme that must not be themed or toggled
pub fn is_restricted(url: &str) -> bool {
    match Url::parse(url) {
        Ok(u) => RESTRICTED_SCHEMES.contains(&u.scheme()),
        Err(_) => RESTRICTED_SCHEMES
            .iter()
            .any(|scheme| url.strip_prefix(scheme).is_some_and(|rest| rest.starts_with(':'))),
    }
}
