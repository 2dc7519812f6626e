//! Page session
//!
//! Glues the controller to its event sources: store change notifications,
//! OS preference changes, DOM mutations and the flush timer. Events are
//! processed one at a time on the caller's thread. While page time advances
//! the color scheme source is refreshed every [`COLOR_SCHEME_POLL`].

use std::time::Duration;

use vibe_dom::Document;

use crate::batcher::FlushStats;
use crate::color_scheme::{ColorScheme, ColorSchemeSubscription};
use crate::controller::{Page, ReactiveController, site_of};
use crate::store::{ConfigStore, StoreSubscription};
use crate::stylesheet::StealthToken;

/// Page time between two reads of the color scheme source
pub const COLOR_SCHEME_POLL: Duration = Duration::from_secs(1);

pub struct PageSession<S: ConfigStore, C: ColorScheme> {
    page: Page,
    controller: ReactiveController,
    store: S,
    color_scheme: C,
    store_events: StoreSubscription,
    scheme_events: ColorSchemeSubscription,
    next_scheme_poll: Duration,
}

impl<S: ConfigStore, C: ColorScheme> PageSession<S, C> {
    /// Attach the engine to a document with a fresh stealth token
    pub async fn attach(document: Document, store: S, color_scheme: C) -> Self {
        Self::attach_with_token(document, store, color_scheme, StealthToken::generate()).await
    }
    
    /// Attach with a given token.
    ///
    /// Subscriptions are taken before the initial read so that no change
    /// published during the fetch is missed.
    pub async fn attach_with_token(document: Document, store: S, color_scheme: C, token: StealthToken) -> Self {
        let store_events = store.subscribe();
        let scheme_events = color_scheme.subscribe();
        let mut controller = ReactiveController::with_token(site_of(&document), token);
        let mut page = Page::new(document);
        
        tracing::debug!("Attaching to {}", page.document.url());
        let snapshot = ReactiveController::load_snapshot(&store).await;
        controller.initialize(&mut page, snapshot, color_scheme.prefers_dark());
        
        Self {
            page,
            controller,
            store,
            color_scheme,
            store_events,
            scheme_events,
            next_scheme_poll: COLOR_SCHEME_POLL,
        }
    }
    
    pub fn document(&self) -> &Document {
        &self.page.document
    }
    
    /// Mutable document access for the page's own scripts
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.page.document
    }
    
    pub fn page(&self) -> &Page {
        &self.page
    }
    
    pub fn controller(&self) -> &ReactiveController {
        &self.controller
    }
    
    pub fn store(&self) -> &S {
        &self.store
    }
    
    pub fn color_scheme(&self) -> &C {
        &self.color_scheme
    }
    
    /// Virtual time since attach
    pub fn now(&self) -> Duration {
        self.page.timers.now()
    }
    
    /// Deliver every queued event; returns how many were handled
    pub fn pump(&mut self) -> usize {
        // mutations that happened before a deactivating change still count as observed
        let mut handled = self.controller.handle_mutations(&mut self.page);
        
        while let Some(change) = self.store_events.try_next() {
            self.controller.handle_store_change(&mut self.page, &change);
            handled += 1;
        }
        while let Some(dark) = self.scheme_events.try_next() {
            self.controller.handle_color_scheme_change(&mut self.page, dark);
            handled += 1;
        }
        
        handled + self.controller.handle_mutations(&mut self.page)
    }
    
    /// Let `by` of page time pass, firing timers and color scheme polls as
    /// they come due
    pub fn advance(&mut self, by: Duration) -> Vec<FlushStats> {
        self.pump();
        let until = self.page.timers.now() + by;
        let mut flushes = Vec::new();
        loop {
            let poll_at = self.next_scheme_poll;
            let poll_first = poll_at <= until
                && self.page.timers.next_deadline().is_none_or(|deadline| poll_at < deadline);
            if poll_first {
                self.page.timers.set_now(poll_at);
                self.poll_color_scheme();
                continue;
            }
            let Some(timer) = self.page.timers.next_due(until) else {
                break;
            };
            if let Some(stats) = self.controller.handle_timer(&mut self.page, timer) {
                flushes.push(stats);
            }
            self.pump();
        }
        self.page.timers.set_now(until);
        flushes
    }
    
    /// Refresh the color scheme source now and deliver what follows
    pub fn poll_color_scheme(&mut self) -> usize {
        self.next_scheme_poll = self.page.timers.now() + COLOR_SCHEME_POLL;
        if self.color_scheme.refresh() {
            tracing::debug!("OS prefers dark: {}", self.color_scheme.prefers_dark());
        }
        self.pump()
    }
    
    /// Tear the engine off the page and hand the document back
    pub fn detach(mut self) -> Document {
        self.pump();
        self.controller.reset(&mut self.page);
        self.page.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_scheme::{ManualColorScheme, SystemColorScheme};
    use std::sync::atomic::{AtomicBool, Ordering};
    use crate::config::keys;
    use crate::store::{MemoryStore, StoreArea};
    use serde_json::json;
    
    fn attach(store: &MemoryStore, scheme: &ManualColorScheme) -> PageSession<MemoryStore, ManualColorScheme> {
        smol::block_on(PageSession::attach(
            Document::new("https://a.com/"),
            store.clone(),
            scheme.clone(),
        ))
    }
    
    #[test]
    fn test_attach_inactive_by_default() {
        let session = attach(&MemoryStore::new(), &ManualColorScheme::new(true));
        assert!(!session.controller().is_active());
        assert!(session.document().elements_by_tag_name("style").is_empty());
    }
    
    #[test]
    fn test_pump_applies_store_change() {
        let store = MemoryStore::new();
        let mut session = attach(&store, &ManualColorScheme::new(false));
        store.insert(StoreArea::Local, keys::IS_ENABLED, json!(true));
        assert_eq!(session.pump(), 1);
        assert!(session.controller().is_active());
    }
    
    #[test]
    fn test_detach_cleans_up() {
        let store = MemoryStore::new();
        store.insert(StoreArea::Local, keys::IS_ENABLED, json!(true));
        let session = attach(&store, &ManualColorScheme::new(false));
        let id = session.controller().stylesheet().style_id().to_string();
        let doc = session.detach();
        assert!(doc.get_element_by_id(&id).is_none());
        assert_eq!(store.subscriber_count(), 0);
    }
    
    static OS_DARK: AtomicBool = AtomicBool::new(false);
    
    fn os_dark() -> bool {
        OS_DARK.load(Ordering::SeqCst)
    }
    
    #[test]
    fn test_os_flip_reaches_controller_on_poll() {
        OS_DARK.store(false, Ordering::SeqCst);
        let store = MemoryStore::new();
        store.insert(StoreArea::Sync, keys::AUTOMATION_MODE, json!("system"));
        let mut session = smol::block_on(PageSession::attach(
            Document::new("https://a.com/"),
            store,
            SystemColorScheme::with_detector(os_dark),
        ));
        assert!(!session.controller().is_active());
        
        OS_DARK.store(true, Ordering::SeqCst);
        session.advance(COLOR_SCHEME_POLL / 2);
        assert!(!session.controller().is_active());
        session.advance(COLOR_SCHEME_POLL / 2);
        assert!(session.controller().is_active());
        assert!(session.controller().os_prefers_dark());
        
        OS_DARK.store(false, Ordering::SeqCst);
        assert_eq!(session.poll_color_scheme(), 1);
        assert!(!session.controller().is_active());
    }
    
    #[test]
    fn test_advance_moves_time() {
        let mut session = attach(&MemoryStore::new(), &ManualColorScheme::new(false));
        assert!(session.advance(Duration::from_millis(500)).is_empty());
        assert_eq!(session.now(), Duration::from_millis(500));
    }
}
