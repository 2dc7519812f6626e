//! Configuration Store
//!
//! Two areas of JSON key/values, `local` and `sync`. Reads are async and can
//! fail; writes produce a [`StoreChange`] for every subscriber listing the keys
//! whose value actually changed.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::notify::{Notifier, Subscription};

/// Raw key/value items of one area
pub type StoreItems = serde_json::Map<String, Value>;

/// Subscription to store changes
pub type StoreSubscription = Subscription<StoreChange>;

/// Storage area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreArea {
    Local,
    Sync,
}

impl StoreArea {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sync => "sync",
        }
    }
}

impl fmt::Display for StoreArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Old and new value of one key; `None` means absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl ValueChange {
    pub fn new(old_value: Option<Value>, new_value: Option<Value>) -> Self {
        Self { old_value, new_value }
    }
}

/// Keys changed in one area by a single write
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    pub area: StoreArea,
    pub changes: BTreeMap<String, ValueChange>,
}

impl StoreChange {
    pub fn new(area: StoreArea) -> Self {
        Self {
            area,
            changes: BTreeMap::new(),
        }
    }
    
    pub fn contains(&self, key: &str) -> bool {
        self.changes.contains_key(key)
    }
    
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} storage unavailable")]
    Unavailable(StoreArea),
    
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("malformed store data: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Asynchronous key/value store with change notifications
#[allow(async_fn_in_trait)]
pub trait ConfigStore {
    /// Read the listed keys of an area; absent keys are omitted
    async fn get(&self, area: StoreArea, keys: &[&str]) -> StoreResult<StoreItems>;
    
    /// Read every item of an area
    async fn get_all(&self, area: StoreArea) -> StoreResult<StoreItems>;
    
    /// Write items into an area
    async fn set(&self, area: StoreArea, items: StoreItems) -> StoreResult<()>;
    
    /// Subscribe to changes in any area
    fn subscribe(&self) -> StoreSubscription;
}

/// Apply `items` to `map`, returning the keys whose value changed
pub fn apply_items(area: StoreArea, map: &mut StoreItems, items: StoreItems) -> StoreChange {
    let mut change = StoreChange::new(area);
    for (key, value) in items {
        let old = map.insert(key.clone(), value.clone());
        if old.as_ref() != Some(&value) {
            change.changes.insert(key, ValueChange::new(old, Some(value)));
        }
    }
    change
}

/// Remove `keys` from `map`, returning the keys that were present
pub fn remove_keys(area: StoreArea, map: &mut StoreItems, keys: &[&str]) -> StoreChange {
    let mut change = StoreChange::new(area);
    for key in keys {
        if let Some(old) = map.remove(*key) {
            change.changes.insert((*key).to_string(), ValueChange::new(Some(old), None));
        }
    }
    change
}

/// Select `keys` out of `map`
pub fn select(map: &StoreItems, keys: &[&str]) -> StoreItems {
    keys.iter()
        .filter_map(|key| map.get(*key).map(|v| ((*key).to_string(), v.clone())))
        .collect()
}

#[derive(Debug, Default)]
struct MemoryState {
    local: RefCell<StoreItems>,
    sync: RefCell<StoreItems>,
    failing: RefCell<HashSet<StoreArea>>,
    notifier: Notifier<StoreChange>,
}

impl MemoryState {
    fn area(&self, area: StoreArea) -> &RefCell<StoreItems> {
        match area {
            StoreArea::Local => &self.local,
            StoreArea::Sync => &self.sync,
        }
    }
}

/// In-memory store; clones share the same state
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Write a single key, notifying subscribers on change
    pub fn insert(&self, area: StoreArea, key: &str, value: Value) -> bool {
        let mut items = StoreItems::new();
        items.insert(key.to_string(), value);
        self.write(area, items)
    }
    
    /// Remove keys, notifying subscribers of those that existed
    pub fn remove(&self, area: StoreArea, keys: &[&str]) -> bool {
        let change = remove_keys(area, &mut self.state.area(area).borrow_mut(), keys);
        self.publish(change)
    }
    
    /// Current value of a key
    pub fn value(&self, area: StoreArea, key: &str) -> Option<Value> {
        self.state.area(area).borrow().get(key).cloned()
    }
    
    /// Make reads of `area` fail until cleared
    pub fn set_failing(&self, area: StoreArea, failing: bool) {
        let mut set = self.state.failing.borrow_mut();
        if failing {
            set.insert(area);
        } else {
            set.remove(&area);
        }
    }
    
    pub fn subscriber_count(&self) -> usize {
        self.state.notifier.subscriber_count()
    }
    
    fn write(&self, area: StoreArea, items: StoreItems) -> bool {
        let change = apply_items(area, &mut self.state.area(area).borrow_mut(), items);
        self.publish(change)
    }
    
    fn publish(&self, change: StoreChange) -> bool {
        if change.is_empty() {
            return false;
        }
        tracing::trace!("{} store changed: {} key(s)", change.area, change.changes.len());
        self.state.notifier.broadcast(&change);
        true
    }
}

impl ConfigStore for MemoryStore {
    async fn get(&self, area: StoreArea, keys: &[&str]) -> StoreResult<StoreItems> {
        if self.state.failing.borrow().contains(&area) {
            return Err(StoreError::Unavailable(area));
        }
        Ok(select(&self.state.area(area).borrow(), keys))
    }
    
    async fn get_all(&self, area: StoreArea) -> StoreResult<StoreItems> {
        if self.state.failing.borrow().contains(&area) {
            return Err(StoreError::Unavailable(area));
        }
        Ok(self.state.area(area).borrow().clone())
    }
    
    async fn set(&self, area: StoreArea, items: StoreItems) -> StoreResult<()> {
        self.write(area, items);
        Ok(())
    }
    
    fn subscribe(&self) -> StoreSubscription {
        self.state.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    
    #[test]
    fn test_get_selects_keys() {
        let store = MemoryStore::new();
        store.insert(StoreArea::Local, "a", json!(1));
        store.insert(StoreArea::Local, "b", json!(2));
        let items = smol::block_on(store.get(StoreArea::Local, &["a", "missing"])).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items["a"], json!(1));
    }
    
    #[test]
    fn test_get_all_returns_whole_area() {
        let store = MemoryStore::new();
        store.insert(StoreArea::Sync, "a", json!(1));
        store.insert(StoreArea::Sync, "unknown", json!("x"));
        store.insert(StoreArea::Local, "b", json!(2));
        let items = smol::block_on(store.get_all(StoreArea::Sync)).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items["unknown"], json!("x"));
        
        store.set_failing(StoreArea::Sync, true);
        assert!(smol::block_on(store.get_all(StoreArea::Sync)).is_err());
    }
    
    #[test]
    fn test_areas_are_separate() {
        let store = MemoryStore::new();
        store.insert(StoreArea::Sync, "a", json!(true));
        assert!(store.value(StoreArea::Local, "a").is_none());
        assert_eq!(store.value(StoreArea::Sync, "a"), Some(json!(true)));
    }
    
    #[test]
    fn test_change_only_on_difference() {
        let store = MemoryStore::new();
        let sub = store.subscribe();
        assert!(store.insert(StoreArea::Local, "warmth", json!(10)));
        assert!(!store.insert(StoreArea::Local, "warmth", json!(10)));
        
        let changes = sub.drain();
        assert_eq!(changes.len(), 1);
        let diff = &changes[0].changes["warmth"];
        assert_eq!(diff.old_value, None);
        assert_eq!(diff.new_value, Some(json!(10)));
    }
    
    #[test]
    fn test_remove_reports_old_value() {
        let store = MemoryStore::new();
        store.insert(StoreArea::Sync, "k", json!("v"));
        let sub = store.subscribe();
        assert!(store.remove(StoreArea::Sync, &["k", "absent"]));
        let change = sub.try_next().unwrap();
        assert_eq!(change.changes.len(), 1);
        assert_eq!(change.changes["k"].old_value, Some(json!("v")));
        assert_eq!(change.changes["k"].new_value, None);
    }
    
    #[test]
    fn test_failing_reads() {
        let store = MemoryStore::new();
        store.set_failing(StoreArea::Sync, true);
        let result = smol::block_on(store.get(StoreArea::Sync, &["k"]));
        assert!(matches!(result, Err(StoreError::Unavailable(StoreArea::Sync))));
        assert!(smol::block_on(store.get(StoreArea::Local, &["k"])).is_ok());
    }
    
    #[test]
    fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        let sub = other.subscribe();
        smol::block_on(store.set(StoreArea::Local, serde_json::Map::from_iter([
            ("isEnabled".to_string(), json!(true)),
        ]))).unwrap();
        assert_eq!(other.value(StoreArea::Local, "isEnabled"), Some(json!(true)));
        assert!(sub.try_next().is_some());
    }
}
