//! File-backed configuration store
//!
//! Both areas live in one JSON file, `{ "local": {...}, "sync": {...} }`.
//! Every read goes back to disk so that separate processes see each other's
//! writes; change notifications only reach subscribers in this process.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use vibe_theme::{
    ConfigStore, Notifier, StoreArea, StoreChange, StoreItems, StoreResult, StoreSubscription,
    apply_items, remove_keys, select,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    local: StoreItems,
    #[serde(default)]
    sync: StoreItems,
}

impl StoreFile {
    fn area_mut(&mut self, area: StoreArea) -> &mut StoreItems {
        match area {
            StoreArea::Local => &mut self.local,
            StoreArea::Sync => &mut self.sync,
        }
    }
    
    fn area(&self, area: StoreArea) -> &StoreItems {
        match area {
            StoreArea::Local => &self.local,
            StoreArea::Sync => &self.sync,
        }
    }
}

/// JSON file store; clones share subscribers
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    notifier: Rc<Notifier<StoreChange>>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            notifier: Rc::new(Notifier::new()),
        }
    }
    
    pub fn path(&self) -> &Path {
        &self.path
    }
    
    async fn load(&self) -> StoreResult<StoreFile> {
        match smol::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(StoreFile::default()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No store at {}, starting empty", self.path.display());
                Ok(StoreFile::default())
            }
            Err(e) => Err(e.into()),
        }
    }
    
    /// Write through a sibling temp file so readers never see a partial file
    async fn save(&self, file: &StoreFile) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(file)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        smol::fs::write(&tmp, text).await?;
        smol::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
    
    async fn commit(&self, file: StoreFile, change: StoreChange) -> StoreResult<bool> {
        if change.is_empty() {
            return Ok(false);
        }
        self.save(&file).await?;
        tracing::debug!("{} store: {} key(s) written to {}", change.area, change.changes.len(), self.path.display());
        self.notifier.broadcast(&change);
        Ok(true)
    }
    
    /// Delete keys from an area
    pub async fn remove(&self, area: StoreArea, keys: &[&str]) -> StoreResult<bool> {
        let mut file = self.load().await?;
        let change = remove_keys(area, file.area_mut(area), keys);
        self.commit(file, change).await
    }
}

impl ConfigStore for FileStore {
    async fn get(&self, area: StoreArea, keys: &[&str]) -> StoreResult<StoreItems> {
        let file = self.load().await?;
        Ok(select(file.area(area), keys))
    }
    
    async fn get_all(&self, area: StoreArea) -> StoreResult<StoreItems> {
        let file = self.load().await?;
        Ok(file.area(area).clone())
    }
    
    async fn set(&self, area: StoreArea, items: StoreItems) -> StoreResult<()> {
        let mut file = self.load().await?;
        let change = apply_items(area, file.area_mut(area), items);
        self.commit(file, change).await?;
        Ok(())
    }
    
    fn subscribe(&self) -> StoreSubscription {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vibe_theme::StoreError;
    
    fn items(key: &str, value: serde_json::Value) -> StoreItems {
        StoreItems::from_iter([(key.to_string(), value)])
    }
    
    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));
        let read = smol::block_on(store.get(StoreArea::Local, &["isEnabled"])).unwrap();
        assert!(read.is_empty());
    }
    
    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::new(&path);
        smol::block_on(store.set(StoreArea::Sync, items("automationMode", json!("system")))).unwrap();
        
        let reopened = FileStore::new(&path);
        let read = smol::block_on(reopened.get(StoreArea::Sync, &["automationMode"])).unwrap();
        assert_eq!(read["automationMode"], json!("system"));
        
        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["sync"]["automationMode"], json!("system"));
        assert!(raw["local"].as_object().unwrap().is_empty());
    }
    
    #[test]
    fn test_get_all_reads_whole_area() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));
        smol::block_on(store.set(StoreArea::Sync, items("automationMode", json!("manual")))).unwrap();
        smol::block_on(store.set(StoreArea::Sync, items("themeVariant", json!("dim")))).unwrap();
        let all = smol::block_on(store.get_all(StoreArea::Sync)).unwrap();
        assert_eq!(all.len(), 2);
        assert!(smol::block_on(store.get_all(StoreArea::Local)).unwrap().is_empty());
    }
    
    #[test]
    fn test_write_notifies_on_change_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));
        let sub = store.subscribe();
        smol::block_on(store.set(StoreArea::Local, items("warmth", json!(10)))).unwrap();
        smol::block_on(store.set(StoreArea::Local, items("warmth", json!(10)))).unwrap();
        assert_eq!(sub.drain().len(), 1);
    }
    
    #[test]
    fn test_remove_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));
        smol::block_on(store.set(StoreArea::Local, items("warmth", json!(10)))).unwrap();
        assert!(smol::block_on(store.remove(StoreArea::Local, &["warmth"])).unwrap());
        assert!(!smol::block_on(store.remove(StoreArea::Local, &["warmth"])).unwrap());
    }
    
    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ nope").unwrap();
        let store = FileStore::new(&path);
        let result = smol::block_on(store.get(StoreArea::Local, &["warmth"]));
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }
}
