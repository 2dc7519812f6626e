//! OS color scheme preference
//!
//! Consulted only in system automation mode. Sources broadcast the new
//! preference whenever it changes. The OS source has no change signal of
//! its own and is polled through [`ColorScheme::refresh`].

use std::cell::Cell;
use std::rc::Rc;

use crate::notify::{Notifier, Subscription};

/// Subscription to preference changes; `true` means dark
pub type ColorSchemeSubscription = Subscription<bool>;

/// A source of the "prefers dark" media preference
pub trait ColorScheme {
    fn prefers_dark(&self) -> bool;
    
    fn subscribe(&self) -> ColorSchemeSubscription;
    
    /// Re-read the preference from its source; true if it changed
    fn refresh(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
struct SchemeState {
    dark: Cell<bool>,
    notifier: Notifier<bool>,
}

impl SchemeState {
    fn update(&self, dark: bool) -> bool {
        if self.dark.replace(dark) == dark {
            return false;
        }
        self.notifier.broadcast(&dark);
        true
    }
}

/// Preference set by the caller; clones share state
#[derive(Debug, Clone, Default)]
pub struct ManualColorScheme {
    state: Rc<SchemeState>,
}

impl ManualColorScheme {
    pub fn new(dark: bool) -> Self {
        let scheme = Self::default();
        scheme.state.dark.set(dark);
        scheme
    }
    
    /// Change the preference, notifying on an actual change
    pub fn set_prefers_dark(&self, dark: bool) -> bool {
        self.state.update(dark)
    }
}

impl ColorScheme for ManualColorScheme {
    fn prefers_dark(&self) -> bool {
        self.state.dark.get()
    }
    
    fn subscribe(&self) -> ColorSchemeSubscription {
        self.state.notifier.subscribe()
    }
}

/// Desktop preference read through `dark-light`
#[derive(Debug, Clone)]
pub struct SystemColorScheme {
    state: Rc<SchemeState>,
    detector: fn() -> bool,
}

impl SystemColorScheme {
    pub fn detect() -> Self {
        Self::with_detector(detect_dark)
    }
    
    /// Read the preference through a custom detector instead of the OS
    pub fn with_detector(detector: fn() -> bool) -> Self {
        let state = Rc::new(SchemeState::default());
        state.dark.set(detector());
        Self { state, detector }
    }
}

impl ColorScheme for SystemColorScheme {
    fn prefers_dark(&self) -> bool {
        self.state.dark.get()
    }
    
    fn subscribe(&self) -> ColorSchemeSubscription {
        self.state.notifier.subscribe()
    }
    
    /// Query the OS again, notifying if the preference flipped
    fn refresh(&self) -> bool {
        self.state.update((self.detector)())
    }
}

fn detect_dark() -> bool {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => true,
        Ok(_) => false,
        Err(e) => {
            tracing::debug!("Color scheme detection failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    
    #[test]
    fn test_manual_notifies_on_change() {
        let scheme = ManualColorScheme::new(false);
        let sub = scheme.subscribe();
        assert!(!scheme.set_prefers_dark(false));
        assert!(scheme.set_prefers_dark(true));
        assert!(scheme.prefers_dark());
        assert_eq!(sub.drain(), vec![true]);
    }
    
    static OS_DARK: AtomicBool = AtomicBool::new(false);
    
    fn os_dark() -> bool {
        OS_DARK.load(Ordering::SeqCst)
    }
    
    #[test]
    fn test_system_refresh_broadcasts_flip() {
        OS_DARK.store(false, Ordering::SeqCst);
        let scheme = SystemColorScheme::with_detector(os_dark);
        let sub = scheme.subscribe();
        assert!(!scheme.prefers_dark());
        assert!(!scheme.refresh());
        
        OS_DARK.store(true, Ordering::SeqCst);
        assert!(scheme.refresh());
        assert!(scheme.prefers_dark());
        assert!(!scheme.refresh());
        assert_eq!(sub.drain(), vec![true]);
    }
    
    #[test]
    fn test_manual_refresh_is_noop() {
        assert!(!ManualColorScheme::new(true).refresh());
    }
    
    #[test]
    fn test_manual_clones_share() {
        let scheme = ManualColorScheme::new(false);
        let other = scheme.clone();
        other.set_prefers_dark(true);
        assert!(scheme.prefers_dark());
    }
}
