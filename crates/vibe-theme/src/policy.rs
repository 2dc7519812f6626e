//! Activation policy

use crate::config::{AutomationMode, ConfigurationSnapshot};
use crate::site::SiteIdentity;

/// Decide whether the dark theme should be active on this page.
///
/// An excluded hostname always wins. In system mode the OS preference
/// decides; manual and scheduled mode follow the global flag, which the
/// background scheduler keeps current in scheduled mode.
pub fn is_active(snapshot: &ConfigurationSnapshot, site: &SiteIdentity, os_prefers_dark: bool) -> bool {
    if site.hostname().is_some_and(|h| snapshot.is_excluded(h)) {
        return false;
    }
    match snapshot.automation_mode {
        AutomationMode::System => os_prefers_dark,
        AutomationMode::Manual | AutomationMode::Scheduled => snapshot.global_enabled,
    }
}
