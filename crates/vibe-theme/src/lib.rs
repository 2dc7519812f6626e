//! Vibe Theme - page-side dark theming engine
//!
//! Decides from merged configuration whether a page should be themed,
//! injects the inversion stylesheet, and keeps media elements counter-inverted
//! while the page mutates.
//!
//! ```text
//! ConfigStore ──► ConfigurationSnapshot ──► policy::is_active
//!                                                │
//!                      ReactiveController ◄──────┘
//!                 ┌────────────┼──────────────┐
//!          StylesheetManager  RestorationEngine  MutationBatcher
//! ```

mod batcher;
mod color_scheme;
mod config;
mod controller;
mod notify;
mod restore;
mod session;
mod site;
mod store;
mod stylesheet;
mod timer;

pub mod policy;

pub use batcher::{FLUSH_DELAY, FlushStats, MutationBatcher};
pub use color_scheme::{ColorScheme, ColorSchemeSubscription, ManualColorScheme, SystemColorScheme};
pub use config::{
    AutomationMode, ClockTime, ConfigError, ConfigurationSnapshot, LocalScope, ScheduleWindow,
    SyncScope, Warmth, keys,
};
pub use controller::{Page, ReactiveController, site_of};
pub use notify::{Notifier, Subscription};
pub use policy::is_active;
pub use restore::RestorationEngine;
pub use session::{COLOR_SCHEME_POLL, PageSession};
pub use site::{RESTRICTED_SCHEMES, SiteIdentity, is_restricted};
pub use store::{
    ConfigStore, MemoryStore, StoreArea, StoreChange, StoreError, StoreItems, StoreResult,
    StoreSubscription, ValueChange, apply_items, remove_keys, select,
};
pub use stylesheet::{NATIVE_MEDIA_TAGS, StealthToken, StylesheetManager};
pub use timer::{TimerId, TimerQueue};
