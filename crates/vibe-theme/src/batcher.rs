//! Mutation Batcher
//!
//! Collects added elements from child-list mutations and scans them in one
//! pass after a fixed delay. `stop` cancels the pending flush synchronously
//! and drops whatever was queued.

use std::collections::BTreeSet;
use std::time::Duration;

use vibe_css::StyleResolver;
use vibe_dom::{Document, MutationObserverInit, MutationRecord, NodeId, ObserverId};

use crate::restore::RestorationEngine;
use crate::timer::{TimerId, TimerQueue};

/// Delay between the first queued insertion and the flush
pub const FLUSH_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatcherState {
    Idle,
    Observing(ObserverId),
}

/// Result of one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Pending roots still attached and scanned
    pub scanned: usize,
    /// Pending roots skipped because they were detached
    pub skipped: usize,
    /// Elements newly marked
    pub marked: usize,
}

#[derive(Debug)]
pub struct MutationBatcher {
    state: BatcherState,
    pending: BTreeSet<NodeId>,
    flush_timer: Option<TimerId>,
    delay: Duration,
}

impl MutationBatcher {
    pub fn new() -> Self {
        Self::with_delay(FLUSH_DELAY)
    }
    
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            state: BatcherState::Idle,
            pending: BTreeSet::new(),
            flush_timer: None,
            delay,
        }
    }
    
    pub fn is_observing(&self) -> bool {
        matches!(self.state, BatcherState::Observing(_))
    }
    
    pub fn observer(&self) -> Option<ObserverId> {
        match self.state {
            BatcherState::Observing(id) => Some(id),
            BatcherState::Idle => None,
        }
    }
    
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
    
    pub fn flush_timer(&self) -> Option<TimerId> {
        self.flush_timer
    }
    
    /// Start watching the document element's subtree for child-list changes;
    /// no-op if already observing
    pub fn start(&mut self, doc: &mut Document) -> bool {
        if self.is_observing() {
            return false;
        }
        let target = doc.document_element().unwrap_or(NodeId::ROOT);
        let observer = doc.observe(target, MutationObserverInit::child_list_subtree());
        self.state = BatcherState::Observing(observer);
        tracing::debug!("Mutation batcher observing");
        true
    }
    
    /// Stop observing, cancel the flush and discard pending nodes
    pub fn stop(&mut self, doc: &mut Document, timers: &mut TimerQueue) -> bool {
        if let Some(timer) = self.flush_timer.take() {
            timers.cancel(timer);
        }
        let dropped = std::mem::take(&mut self.pending).len();
        let BatcherState::Observing(observer) = std::mem::replace(&mut self.state, BatcherState::Idle) else {
            return false;
        };
        doc.disconnect(observer);
        tracing::debug!("Mutation batcher stopped, {} pending node(s) dropped", dropped);
        true
    }
    
    /// Pull the observer's queued records and enqueue them
    pub fn collect(&mut self, doc: &mut Document, timers: &mut TimerQueue) -> usize {
        let Some(observer) = self.observer() else {
            return 0;
        };
        let records = doc.take_records(observer);
        self.enqueue(doc, &records, timers)
    }
    
    /// Queue every added element; schedules a flush if none is pending.
    /// Returns the number of newly queued nodes.
    pub fn enqueue(&mut self, doc: &Document, records: &[MutationRecord], timers: &mut TimerQueue) -> usize {
        if !self.is_observing() {
            return 0;
        }
        let before = self.pending.len();
        for record in records {
            for node in &record.added_nodes {
                if doc.is_element(*node) {
                    self.pending.insert(*node);
                }
            }
        }
        if !self.pending.is_empty() && self.flush_timer.is_none() {
            self.flush_timer = Some(timers.schedule(self.delay));
        }
        self.pending.len() - before
    }
    
    /// Check if `timer` is this batcher's flush
    pub fn owns_timer(&self, timer: TimerId) -> bool {
        self.flush_timer == Some(timer)
    }
    
    /// Scan every pending node still attached, then clear the set
    pub fn flush(&mut self, doc: &mut Document, engine: &RestorationEngine) -> FlushStats {
        self.flush_timer = None;
        let pending = std::mem::take(&mut self.pending);
        let mut stats = FlushStats::default();
        if pending.is_empty() {
            return stats;
        }
        let resolver = StyleResolver::for_document(doc);
        for node in pending {
            if doc.is_connected(node) {
                stats.scanned += 1;
                stats.marked += engine.scan_tree_with(doc, &resolver, node);
            } else {
                stats.skipped += 1;
            }
        }
        tracing::debug!(
            "Flushed {} root(s), {} detached, {} marked",
            stats.scanned, stats.skipped, stats.marked
        );
        stats
    }
}

impl Default for MutationBatcher {
    fn default() -> Self {
        Self::new()
    }
}
