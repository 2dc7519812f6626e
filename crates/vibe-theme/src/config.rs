//! Configuration Snapshot
//!
//! In-memory mirror of the two store scopes. Decoding is lenient key by key:
//! a missing key, or one holding the wrong JSON type, takes its default.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{StoreArea, StoreChange, StoreItems};

/// Store keys
pub mod keys {
    pub const IS_ENABLED: &str = "isEnabled";
    pub const WARMTH: &str = "warmth";
    pub const DISABLED_DOMAINS: &str = "disabledDomains";
    pub const AUTOMATION_MODE: &str = "automationMode";
    pub const START_TIME: &str = "startTime";
    pub const END_TIME: &str = "endTime";
    
    /// Keys held by the low-latency local scope
    pub const LOCAL: &[&str] = &[IS_ENABLED, WARMTH];
    /// Keys held by the synchronized scope
    pub const SYNC: &[&str] = &[DISABLED_DOMAINS, AUTOMATION_MODE, START_TIME, END_TIME];
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid time `{0}`, expected HH:MM")]
    InvalidTime(String),
    #[error("unknown automation mode `{0}`")]
    UnknownMode(String),
}

/// How the on/off state is driven
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationMode {
    /// User toggle
    #[default]
    Manual,
    /// Follow the OS color scheme
    System,
    /// Time window, evaluated by the background scheduler
    Scheduled,
}

impl AutomationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::System => "system",
            Self::Scheduled => "scheduled",
        }
    }
}

impl FromStr for AutomationMode {
    type Err = ConfigError;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "system" => Ok(Self::System),
            "scheduled" => Ok(Self::Scheduled),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for AutomationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sepia intensity, always within 0..=100
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Warmth(u8);

impl Warmth {
    pub const MAX: u8 = 100;
    
    /// Clamp any integer into range
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, Self::MAX as i64) as u8)
    }
    
    pub fn value(self) -> u8 {
        self.0
    }
    
    /// Sepia amount in 0.0..=1.0
    pub fn sepia(self) -> f64 {
        f64::from(self.0) / 100.0
    }
    
    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64()
            .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            .map(Self::new)
    }
}

/// Minute-precision wall clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Default start of the scheduled window (18:00)
    pub const DEFAULT_START: ClockTime = ClockTime { hour: 18, minute: 0 };
    /// Default end of the scheduled window (06:00)
    pub const DEFAULT_END: ClockTime = ClockTime { hour: 6, minute: 0 };
    
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }
    
    /// Minutes since midnight
    pub fn minutes(self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ConfigError;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ConfigError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        if h.is_empty() || m.len() != 2 {
            return Err(err());
        }
        let hour = h.parse::<u8>().map_err(|_| err())?;
        let minute = m.parse::<u8>().map_err(|_| err())?;
        Self::new(hour, minute).ok_or_else(err)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ConfigError;
    
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Daily time window; wraps past midnight when `start >= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl ScheduleWindow {
    /// Check if `minute_of_day` falls inside the window
    pub fn contains(&self, minute_of_day: u16) -> bool {
        let (start, end) = (self.start.minutes(), self.end.minutes());
        if start < end {
            minute_of_day >= start && minute_of_day < end
        } else {
            minute_of_day >= start || minute_of_day < end
        }
    }
}

impl Default for ScheduleWindow {
    fn default() -> Self {
        Self {
            start: ClockTime::DEFAULT_START,
            end: ClockTime::DEFAULT_END,
        }
    }
}

/// Local scope `{isEnabled, warmth}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalScope {
    pub is_enabled: bool,
    pub warmth: Warmth,
}

impl LocalScope {
    pub fn from_items(items: &StoreItems) -> Self {
        let mut scope = Self::default();
        for (key, value) in items {
            scope.set(key, Some(value));
        }
        scope
    }
    
    /// Apply one key; `None` resets it. Returns false for unknown keys.
    fn set(&mut self, key: &str, value: Option<&Value>) -> bool {
        match key {
            keys::IS_ENABLED => {
                self.is_enabled = value.and_then(Value::as_bool).unwrap_or(false);
            }
            keys::WARMTH => {
                self.warmth = value.and_then(Warmth::from_json).unwrap_or_default();
            }
            _ => return false,
        }
        true
    }
}

/// Synchronized scope `{disabledDomains, automationMode, startTime, endTime}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncScope {
    pub disabled_domains: BTreeSet<String>,
    pub automation_mode: AutomationMode,
    pub schedule: ScheduleWindow,
}

impl SyncScope {
    pub fn from_items(items: &StoreItems) -> Self {
        let mut scope = Self::default();
        for (key, value) in items {
            scope.set(key, Some(value));
        }
        scope
    }
    
    fn set(&mut self, key: &str, value: Option<&Value>) -> bool {
        match key {
            keys::DISABLED_DOMAINS => {
                self.disabled_domains = value
                    .and_then(Value::as_array)
                    .map(|list| {
                        list.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
            }
            keys::AUTOMATION_MODE => {
                self.automation_mode = value
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default();
            }
            keys::START_TIME => {
                self.schedule.start = parse_time(value).unwrap_or(ClockTime::DEFAULT_START);
            }
            keys::END_TIME => {
                self.schedule.end = parse_time(value).unwrap_or(ClockTime::DEFAULT_END);
            }
            _ => return false,
        }
        true
    }
}

fn parse_time(value: Option<&Value>) -> Option<ClockTime> {
    value?.as_str()?.parse().ok()
}

/// Merged view of both scopes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSnapshot {
    pub global_enabled: bool,
    pub warmth: Warmth,
    pub exclusion_list: BTreeSet<String>,
    pub automation_mode: AutomationMode,
    pub schedule: ScheduleWindow,
}

impl ConfigurationSnapshot {
    /// Merge both scopes
    pub fn from_scopes(local: LocalScope, sync: SyncScope) -> Self {
        Self {
            global_enabled: local.is_enabled,
            warmth: local.warmth,
            exclusion_list: sync.disabled_domains,
            automation_mode: sync.automation_mode,
            schedule: sync.schedule,
        }
    }
    
    /// Build from raw store reads
    pub fn from_items(local: &StoreItems, sync: &StoreItems) -> Self {
        Self::from_scopes(LocalScope::from_items(local), SyncScope::from_items(sync))
    }
    
    fn split(&self) -> (LocalScope, SyncScope) {
        (
            LocalScope {
                is_enabled: self.global_enabled,
                warmth: self.warmth,
            },
            SyncScope {
                disabled_domains: self.exclusion_list.clone(),
                automation_mode: self.automation_mode,
                schedule: self.schedule,
            },
        )
    }
    
    /// New snapshot with the changed keys applied; `None` if no tracked key changed
    pub fn merged(&self, change: &StoreChange) -> Option<Self> {
        let (mut local, mut sync) = self.split();
        let mut touched = false;
        for (key, diff) in &change.changes {
            let value = diff.new_value.as_ref();
            touched |= match change.area {
                StoreArea::Local => local.set(key, value),
                StoreArea::Sync => sync.set(key, value),
            };
        }
        touched.then(|| Self::from_scopes(local, sync))
    }
    
    /// Check whether a hostname is on the exclusion list
    pub fn is_excluded(&self, hostname: &str) -> bool {
        self.exclusion_list.contains(hostname)
    }
}
