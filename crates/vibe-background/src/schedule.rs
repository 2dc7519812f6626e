//! Scheduled automation
//!
//! In scheduled mode the global flag follows a daily time window. The check
//! runs once per [`PERIOD`] and writes `isEnabled` only when it disagrees
//! with the window.

use std::time::Duration;

use chrono::{NaiveTime, Timelike};
use serde_json::{Value, json};
use vibe_theme::{AutomationMode, ConfigStore, StoreArea, StoreResult, SyncScope, keys};

pub use vibe_theme::{ClockTime, ConfigError as ScheduleError, ScheduleWindow};

/// Interval between schedule checks
pub const PERIOD: Duration = Duration::from_secs(5 * 60);

const SCHEDULE_KEYS: &[&str] = &[keys::AUTOMATION_MODE, keys::START_TIME, keys::END_TIME];

/// Result of one schedule check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// Automation mode is not `scheduled`
    NotScheduled,
    /// Flag already matched the window
    Unchanged(bool),
    /// Flag was rewritten to the given value
    Switched(bool),
}

/// Minutes since midnight
pub fn minute_of_day(time: NaiveTime) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

/// Bring `isEnabled` in line with the schedule window at `now`
pub async fn check_schedule<S: ConfigStore>(store: &S, now: NaiveTime) -> StoreResult<ScheduleOutcome> {
    let sync = SyncScope::from_items(&store.get(StoreArea::Sync, SCHEDULE_KEYS).await?);
    if sync.automation_mode != AutomationMode::Scheduled {
        return Ok(ScheduleOutcome::NotScheduled);
    }
    
    let should_enable = sync.schedule.contains(minute_of_day(now));
    let local = store.get(StoreArea::Local, &[keys::IS_ENABLED]).await?;
    if local.get(keys::IS_ENABLED).and_then(Value::as_bool) == Some(should_enable) {
        tracing::debug!("Schedule check at {}: unchanged ({})", now.format("%H:%M"), should_enable);
        return Ok(ScheduleOutcome::Unchanged(should_enable));
    }
    
    let mut items = vibe_theme::StoreItems::new();
    items.insert(keys::IS_ENABLED.to_string(), json!(should_enable));
    store.set(StoreArea::Local, items).await?;
    tracing::info!(
        "Schedule {}-{}: theme {}",
        sync.schedule.start, sync.schedule.end,
        if should_enable { "enabled" } else { "disabled" },
    );
    Ok(ScheduleOutcome::Switched(should_enable))
}
