//! Reactive Controller
//!
//! Owns the configuration snapshot and the per-page components, and re-runs
//! the activation sequence whenever configuration or the OS preference
//! changes.

use smol::future;
use vibe_dom::{Document, NodeId};

use crate::batcher::{FlushStats, MutationBatcher};
use crate::config::{AutomationMode, ConfigurationSnapshot, keys};
use crate::policy;
use crate::restore::RestorationEngine;
use crate::site::SiteIdentity;
use crate::store::{ConfigStore, StoreArea, StoreChange, StoreItems};
use crate::stylesheet::{StealthToken, StylesheetManager};
use crate::timer::{TimerId, TimerQueue};

/// The document together with its timer queue
#[derive(Debug, Default)]
pub struct Page {
    pub document: Document,
    pub timers: TimerQueue,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            timers: TimerQueue::new(),
        }
    }
}

#[derive(Debug)]
pub struct ReactiveController {
    snapshot: ConfigurationSnapshot,
    site: SiteIdentity,
    token: StealthToken,
    stylesheet: StylesheetManager,
    engine: RestorationEngine,
    batcher: MutationBatcher,
    os_prefers_dark: bool,
    active: bool,
}

impl ReactiveController {
    pub fn new(site: SiteIdentity) -> Self {
        Self::with_token(site, StealthToken::generate())
    }
    
    pub fn with_token(site: SiteIdentity, token: StealthToken) -> Self {
        Self {
            snapshot: ConfigurationSnapshot::default(),
            site,
            stylesheet: StylesheetManager::new(&token),
            engine: RestorationEngine::new(&token),
            token,
            batcher: MutationBatcher::new(),
            os_prefers_dark: false,
            active: false,
        }
    }
    
    /// Read both store scopes as one logical fetch.
    ///
    /// Waits for both reads before merging. A failed read leaves its scope
    /// at the defaults.
    pub async fn load_snapshot<S: ConfigStore>(store: &S) -> ConfigurationSnapshot {
        let (local, sync) = future::zip(
            store.get(StoreArea::Local, keys::LOCAL),
            store.get(StoreArea::Sync, keys::SYNC),
        ).await;
        let local = local.unwrap_or_else(|e| {
            tracing::warn!("Local settings read failed, using defaults: {}", e);
            StoreItems::new()
        });
        let sync = sync.unwrap_or_else(|e| {
            tracing::warn!("Sync settings read failed, using defaults: {}", e);
            StoreItems::new()
        });
        ConfigurationSnapshot::from_items(&local, &sync)
    }
    
    pub fn snapshot(&self) -> &ConfigurationSnapshot {
        &self.snapshot
    }
    
    pub fn site(&self) -> &SiteIdentity {
        &self.site
    }
    
    pub fn token(&self) -> &StealthToken {
        &self.token
    }
    
    pub fn stylesheet(&self) -> &StylesheetManager {
        &self.stylesheet
    }
    
    pub fn engine(&self) -> &RestorationEngine {
        &self.engine
    }
    
    pub fn batcher(&self) -> &MutationBatcher {
        &self.batcher
    }
    
    pub fn os_prefers_dark(&self) -> bool {
        self.os_prefers_dark
    }
    
    /// Outcome of the most recent activation sequence
    pub fn is_active(&self) -> bool {
        self.active
    }
    
    /// Install the first snapshot and run the activation sequence
    pub fn initialize(&mut self, page: &mut Page, snapshot: ConfigurationSnapshot, os_prefers_dark: bool) -> bool {
        self.snapshot = snapshot;
        self.os_prefers_dark = os_prefers_dark;
        self.update_state(page)
    }
    
    /// Evaluate the policy and bring the page in line with it
    pub fn update_state(&mut self, page: &mut Page) -> bool {
        let active = policy::is_active(&self.snapshot, &self.site, self.os_prefers_dark);
        let doc = &mut page.document;
        if active {
            if let Err(e) = self.stylesheet.apply(doc, self.snapshot.warmth) {
                tracing::warn!("Stylesheet injection failed: {}", e);
            }
            // late attach: content already parsed gets one full pass
            if doc.body().is_some() {
                let root = doc.document_element().unwrap_or(NodeId::ROOT);
                self.engine.scan_tree(doc, root);
            }
            self.batcher.start(doc);
        } else {
            self.deactivate(page);
        }
        
        if active != self.active {
            tracing::info!(
                "Theme {} on {} ({} mode)",
                if active { "enabled" } else { "disabled" },
                self.site.hostname().unwrap_or("<no host>"),
                self.snapshot.automation_mode,
            );
        }
        self.active = active;
        active
    }
    
    fn deactivate(&mut self, page: &mut Page) {
        self.stylesheet.remove(&mut page.document);
        self.batcher.stop(&mut page.document, &mut page.timers);
        self.engine.cleanup(&mut page.document);
    }
    
    /// Merge a store change; re-runs the sequence if a tracked key changed
    pub fn handle_store_change(&mut self, page: &mut Page, change: &StoreChange) -> bool {
        let Some(snapshot) = self.snapshot.merged(change) else {
            tracing::trace!("Ignoring {} change with no tracked keys", change.area);
            return false;
        };
        self.snapshot = snapshot;
        self.update_state(page);
        true
    }
    
    /// Record the OS preference; re-runs the sequence only in system mode
    pub fn handle_color_scheme_change(&mut self, page: &mut Page, prefers_dark: bool) -> bool {
        self.os_prefers_dark = prefers_dark;
        if self.snapshot.automation_mode != AutomationMode::System {
            return false;
        }
        self.update_state(page);
        true
    }
    
    /// Feed queued mutation records to the batcher
    pub fn handle_mutations(&mut self, page: &mut Page) -> usize {
        self.batcher.collect(&mut page.document, &mut page.timers)
    }
    
    /// Run the flush if `timer` belongs to the batcher
    pub fn handle_timer(&mut self, page: &mut Page, timer: TimerId) -> Option<FlushStats> {
        if !self.batcher.owns_timer(timer) {
            return None;
        }
        Some(self.batcher.flush(&mut page.document, &self.engine))
    }
    
    /// Take everything off the page; safe to call repeatedly
    pub fn reset(&mut self, page: &mut Page) {
        self.deactivate(page);
        if self.active {
            tracing::info!("Theme reset on {}", self.site.hostname().unwrap_or("<no host>"));
        }
        self.active = false;
    }
}

/// Hostname-derived identity of a document
pub fn site_of(document: &Document) -> SiteIdentity {
    SiteIdentity::from_url(document.url())
}
