//! Settings export and import
//!
//! The exported document is the whole synchronized scope as a JSON object,
//! keys this version does not read included. Imports are validated as a
//! whole before anything is written.

use serde_json::Value;
use vibe_theme::{AutomationMode, ConfigStore, StoreArea, StoreError, StoreItems, keys};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    
    #[error("settings must be a JSON object")]
    NotAnObject,
    
    #[error("`disabledDomains` must be an array of strings")]
    InvalidDomains,
    
    #[error("unknown automation mode {0}")]
    InvalidMode(Value),
    
    #[error("`{0}` must be a string")]
    InvalidTime(&'static str),
    
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Serialize the synchronized scope as pretty JSON
pub async fn export<S: ConfigStore>(store: &S) -> Result<String, SettingsError> {
    let items = store.get_all(StoreArea::Sync).await?;
    Ok(serde_json::to_string_pretty(&items)?)
}

/// Check a settings document; `null` values count as absent
pub fn validate(value: &Value) -> Result<&StoreItems, SettingsError> {
    let items = value.as_object().ok_or(SettingsError::NotAnObject)?;
    
    match items.get(keys::DISABLED_DOMAINS) {
        None | Some(Value::Null) => {}
        Some(Value::Array(list)) if list.iter().all(Value::is_string) => {}
        Some(_) => return Err(SettingsError::InvalidDomains),
    }
    
    match items.get(keys::AUTOMATION_MODE) {
        None | Some(Value::Null) => {}
        Some(mode) => {
            let known = mode.as_str().is_some_and(|m| m.parse::<AutomationMode>().is_ok());
            if !known {
                return Err(SettingsError::InvalidMode(mode.clone()));
            }
        }
    }
    
    for key in [keys::START_TIME, keys::END_TIME] {
        match items.get(key) {
            None | Some(Value::Null | Value::String(_)) => {}
            Some(_) => return Err(SettingsError::InvalidTime(key)),
        }
    }
    
    Ok(items)
}

/// Validate and write a settings document; returns the number of keys written
pub async fn import<S: ConfigStore>(store: &S, json: &str) -> Result<usize, SettingsError> {
    let value: Value = serde_json::from_str(json)?;
    let items = validate(&value)?.clone();
    let count = items.len();
    store.set(StoreArea::Sync, items).await?;
    tracing::info!("Imported {} setting(s)", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vibe_theme::MemoryStore;
    
    #[test]
    fn test_validate_accepts_full_document() {
        let doc = json!({
            "disabledDomains": ["a.com"],
            "automationMode": "scheduled",
            "startTime": "20:00",
            "endTime": "07:00",
        });
        assert!(validate(&doc).is_ok());
        assert!(validate(&json!({})).is_ok());
    }
    
    #[test]
    fn test_validate_rejects() {
        assert!(matches!(validate(&json!([1])), Err(SettingsError::NotAnObject)));
        assert!(matches!(validate(&json!(null)), Err(SettingsError::NotAnObject)));
        assert!(matches!(
            validate(&json!({ "disabledDomains": "a.com" })),
            Err(SettingsError::InvalidDomains)
        ));
        assert!(matches!(
            validate(&json!({ "disabledDomains": ["a.com", 1] })),
            Err(SettingsError::InvalidDomains)
        ));
        assert!(matches!(
            validate(&json!({ "automationMode": "dusk" })),
            Err(SettingsError::InvalidMode(_))
        ));
        assert!(matches!(
            validate(&json!({ "endTime": 700 })),
            Err(SettingsError::InvalidTime("endTime"))
        ));
    }
    
    #[test]
    fn test_import_writes_nothing_when_invalid() {
        let store = MemoryStore::new();
        let result = smol::block_on(import(&store, r#"{"disabledDomains":["a.com"],"automationMode":7}"#));
        assert!(result.is_err());
        assert!(store.value(StoreArea::Sync, keys::DISABLED_DOMAINS).is_none());
    }
    
    #[test]
    fn test_import_bad_json() {
        let store = MemoryStore::new();
        let result = smol::block_on(import(&store, "{not json"));
        assert!(matches!(result, Err(SettingsError::Json(_))));
    }
    
    #[test]
    fn test_export_then_import() {
        let source = MemoryStore::new();
        source.insert(StoreArea::Sync, keys::DISABLED_DOMAINS, json!(["a.com", "b.org"]));
        source.insert(StoreArea::Sync, keys::AUTOMATION_MODE, json!("system"));
        source.insert(StoreArea::Local, keys::WARMTH, json!(40));
        let text = smol::block_on(export(&source)).unwrap();
        assert!(!text.contains("warmth"));
        
        let target = MemoryStore::new();
        assert_eq!(smol::block_on(import(&target, &text)).unwrap(), 2);
        assert_eq!(target.value(StoreArea::Sync, keys::AUTOMATION_MODE), Some(json!("system")));
    }
    
    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let store = MemoryStore::new();
        let written = smol::block_on(import(&store, r#"{"automationMode":"manual","themeVariant":"dim"}"#)).unwrap();
        assert_eq!(written, 2);
        
        let exported: Value = serde_json::from_str(&smol::block_on(export(&store)).unwrap()).unwrap();
        assert_eq!(exported["themeVariant"], json!("dim"));
        assert_eq!(exported["automationMode"], json!("manual"));
    }
}
