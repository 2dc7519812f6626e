//! Mutation Observer API
//!
//! Observers register interest in a target node; the document reports every
//! tree or attribute change and each observer queues the records it matches.
//! Records are pulled with `take_records`, mirroring how a page script's
//! callback receives a batch.

use crate::NodeId;

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    /// Child list change on `target`
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            attribute_name: None,
            old_value: None,
        }
    }
    
    /// Attribute change on `target`
    pub fn attribute(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }
}

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    /// `{ childList: true, subtree: true }`
    pub fn child_list_subtree() -> Self {
        Self {
            child_list: true,
            subtree: true,
            ..Default::default()
        }
    }
}

/// Observer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Single mutation observer
#[derive(Debug)]
struct MutationObserver {
    id: ObserverId,
    observations: Vec<(NodeId, MutationObserverInit)>,
    pending_records: Vec<MutationRecord>,
}

impl MutationObserver {
    /// Record a mutation if any observation covers it.
    /// `contains(a, b)` answers "is `a` an inclusive ancestor of `b`".
    fn record(&mut self, mutation: &MutationRecord, contains: &impl Fn(NodeId, NodeId) -> bool) {
        let matching = self.observations.iter().find(|(target, options)| {
            let matches_target = *target == mutation.target
                || (options.subtree && contains(*target, mutation.target));
            let matches_type = match mutation.mutation_type {
                MutationType::Attributes => options.attributes,
                MutationType::ChildList => options.child_list,
            };
            let passes_filter = match (&options.attribute_filter, &mutation.attribute_name) {
                (Some(filter), Some(attr)) => filter.contains(attr),
                _ => true,
            };
            matches_target && matches_type && passes_filter
        });
        
        if let Some((_, options)) = matching {
            let mut record = mutation.clone();
            if record.mutation_type == MutationType::Attributes && !options.attribute_old_value {
                record.old_value = None;
            }
            self.pending_records.push(record);
        }
    }
}

/// Registry of all observers attached to a document
#[derive(Debug)]
pub struct MutationObservers {
    next_id: u64,
    observers: Vec<MutationObserver>,
}

impl MutationObservers {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            observers: Vec::new(),
        }
    }
    
    /// Create an observer watching `target`
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push(MutationObserver {
            id,
            observations: vec![(target, options)],
            pending_records: Vec::new(),
        });
        id
    }
    
    /// Disconnect an observer, dropping its queued records.
    /// Returns false if the observer was unknown.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }
    
    /// Check if an observer is connected
    pub fn is_connected(&self, id: ObserverId) -> bool {
        self.observers.iter().any(|o| o.id == id)
    }
    
    /// Number of connected observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }
    
    /// Check if no observer is connected
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
    
    /// Take queued records for an observer
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers.iter_mut()
            .find(|o| o.id == id)
            .map(|o| std::mem::take(&mut o.pending_records))
            .unwrap_or_default()
    }
    
    /// Check if an observer has queued records
    pub fn has_pending(&self, id: ObserverId) -> bool {
        self.observers.iter().any(|o| o.id == id && !o.pending_records.is_empty())
    }
    
    /// Notify all observers of a mutation
    pub fn notify(&mut self, mutation: MutationRecord, contains: impl Fn(NodeId, NodeId) -> bool) {
        for observer in &mut self.observers {
            observer.record(&mutation, &contains);
        }
    }
}

impl Default for MutationObservers {
    fn default() -> Self {
        Self::new()
    }
}
