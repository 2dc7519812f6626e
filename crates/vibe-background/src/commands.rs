//! User commands
//!
//! Keyboard-shortcut and context-menu actions, expressed as store writes.
//! Pages pick the result up through their change subscription.

use serde_json::{Value, json};
use vibe_theme::{
    AutomationMode, ConfigStore, ScheduleWindow, SiteIdentity, StoreArea, StoreItems, StoreResult,
    Warmth, is_restricted, keys,
};

/// What a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// No usable hostname, or a restricted page
    Ignored,
    /// Global flag now has this value
    GlobalEnabled(bool),
    /// Hostname added to the exclusion list
    Excluded(String),
    /// Hostname taken off the exclusion list
    Included(String),
    /// Hostname was already excluded
    AlreadyExcluded(String),
}

/// Hostname a site command applies to
fn target_host(url: &str) -> Option<String> {
    if is_restricted(url) {
        return None;
    }
    SiteIdentity::from_url(url).hostname().map(str::to_string)
}

async fn write<S: ConfigStore>(store: &S, area: StoreArea, key: &str, value: Value) -> StoreResult<()> {
    let mut items = StoreItems::new();
    items.insert(key.to_string(), value);
    store.set(area, items).await
}

/// Exclusion list in stored order
async fn disabled_domains<S: ConfigStore>(store: &S) -> StoreResult<Vec<String>> {
    let items = store.get(StoreArea::Sync, &[keys::DISABLED_DOMAINS]).await?;
    Ok(items.get(keys::DISABLED_DOMAINS)
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default())
}

/// Flip the global flag
pub async fn toggle_global<S: ConfigStore>(store: &S) -> StoreResult<CommandOutcome> {
    let items = store.get(StoreArea::Local, &[keys::IS_ENABLED]).await?;
    let enabled = !items.get(keys::IS_ENABLED).and_then(Value::as_bool).unwrap_or(false);
    write(store, StoreArea::Local, keys::IS_ENABLED, json!(enabled)).await?;
    tracing::info!("Global theme {}", if enabled { "enabled" } else { "disabled" });
    Ok(CommandOutcome::GlobalEnabled(enabled))
}

/// Add or remove the page's hostname from the exclusion list
pub async fn toggle_site<S: ConfigStore>(store: &S, url: &str) -> StoreResult<CommandOutcome> {
    let Some(host) = target_host(url) else {
        tracing::debug!("Ignoring site toggle for {}", url);
        return Ok(CommandOutcome::Ignored);
    };
    let mut domains = disabled_domains(store).await?;
    let outcome = if let Some(pos) = domains.iter().position(|d| *d == host) {
        domains.remove(pos);
        CommandOutcome::Included(host)
    } else {
        domains.push(host.clone());
        CommandOutcome::Excluded(host)
    };
    write(store, StoreArea::Sync, keys::DISABLED_DOMAINS, json!(domains)).await?;
    tracing::info!("Site toggle: {:?}", outcome);
    Ok(outcome)
}

/// Exclude the page's hostname; never removes it
pub async fn exclude_site<S: ConfigStore>(store: &S, url: &str) -> StoreResult<CommandOutcome> {
    let Some(host) = target_host(url) else {
        tracing::debug!("Ignoring exclusion for {}", url);
        return Ok(CommandOutcome::Ignored);
    };
    let mut domains = disabled_domains(store).await?;
    if domains.contains(&host) {
        return Ok(CommandOutcome::AlreadyExcluded(host));
    }
    domains.push(host.clone());
    write(store, StoreArea::Sync, keys::DISABLED_DOMAINS, json!(domains)).await?;
    tracing::info!("Excluded {}", host);
    Ok(CommandOutcome::Excluded(host))
}

/// Store a warmth value, clamped to 0..=100
pub async fn set_warmth<S: ConfigStore>(store: &S, value: i64) -> StoreResult<Warmth> {
    let warmth = Warmth::new(value);
    write(store, StoreArea::Local, keys::WARMTH, json!(warmth.value())).await?;
    Ok(warmth)
}

pub async fn set_automation_mode<S: ConfigStore>(store: &S, mode: AutomationMode) -> StoreResult<()> {
    write(store, StoreArea::Sync, keys::AUTOMATION_MODE, json!(mode.as_str())).await
}

/// Store both ends of the schedule window in one write
pub async fn set_schedule<S: ConfigStore>(store: &S, window: ScheduleWindow) -> StoreResult<()> {
    let mut items = StoreItems::new();
    items.insert(keys::START_TIME.to_string(), json!(window.start.to_string()));
    items.insert(keys::END_TIME.to_string(), json!(window.end.to_string()));
    store.set(StoreArea::Sync, items).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibe_theme::MemoryStore;
    
    #[test]
    fn test_toggle_global() {
        let store = MemoryStore::new();
        let first = smol::block_on(toggle_global(&store)).unwrap();
        assert_eq!(first, CommandOutcome::GlobalEnabled(true));
        let second = smol::block_on(toggle_global(&store)).unwrap();
        assert_eq!(second, CommandOutcome::GlobalEnabled(false));
        assert_eq!(store.value(StoreArea::Local, keys::IS_ENABLED), Some(json!(false)));
    }
    
    #[test]
    fn test_toggle_site_round_trip() {
        let store = MemoryStore::new();
        store.insert(StoreArea::Sync, keys::DISABLED_DOMAINS, json!(["z.com"]));
        let url = "https://a.com/page";
        assert_eq!(
            smol::block_on(toggle_site(&store, url)).unwrap(),
            CommandOutcome::Excluded("a.com".into()),
        );
        assert_eq!(store.value(StoreArea::Sync, keys::DISABLED_DOMAINS), Some(json!(["z.com", "a.com"])));
        assert_eq!(
            smol::block_on(toggle_site(&store, url)).unwrap(),
            CommandOutcome::Included("a.com".into()),
        );
        assert_eq!(store.value(StoreArea::Sync, keys::DISABLED_DOMAINS), Some(json!(["z.com"])));
    }
    
    #[test]
    fn test_exclude_only_adds() {
        let store = MemoryStore::new();
        let url = "https://a.com/";
        smol::block_on(exclude_site(&store, url)).unwrap();
        let sub = store.subscribe();
        assert_eq!(
            smol::block_on(exclude_site(&store, url)).unwrap(),
            CommandOutcome::AlreadyExcluded("a.com".into()),
        );
        assert!(sub.try_next().is_none());
    }
    
    #[test]
    fn test_ignored_urls() {
        let store = MemoryStore::new();
        for url in ["chrome://settings", "about:blank", "data:text/plain,x", "nonsense", "file:///a.html"] {
            assert_eq!(smol::block_on(toggle_site(&store, url)).unwrap(), CommandOutcome::Ignored);
            assert_eq!(smol::block_on(exclude_site(&store, url)).unwrap(), CommandOutcome::Ignored);
        }
        assert!(store.value(StoreArea::Sync, keys::DISABLED_DOMAINS).is_none());
    }
    
    #[test]
    fn test_set_warmth_clamps() {
        let store = MemoryStore::new();
        assert_eq!(smol::block_on(set_warmth(&store, 140)).unwrap().value(), 100);
        assert_eq!(store.value(StoreArea::Local, keys::WARMTH), Some(json!(100)));
    }
    
    #[test]
    fn test_set_schedule() {
        let store = MemoryStore::new();
        let window = ScheduleWindow {
            start: "21:30".parse().unwrap(),
            end: "07:15".parse().unwrap(),
        };
        smol::block_on(set_schedule(&store, window)).unwrap();
        smol::block_on(set_automation_mode(&store, AutomationMode::Scheduled)).unwrap();
        assert_eq!(store.value(StoreArea::Sync, keys::START_TIME), Some(json!("21:30")));
        assert_eq!(store.value(StoreArea::Sync, keys::AUTOMATION_MODE), Some(json!("scheduled")));
    }
}
