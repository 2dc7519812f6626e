//! Vibe Background - automation outside the page
//!
//! Scheduled switching of the global flag, the user commands that edit the
//! store, settings export/import and a JSON file store for the `vibe` CLI.

pub mod commands;
pub mod file_store;
pub mod schedule;
pub mod settings;

pub use commands::{CommandOutcome, exclude_site, toggle_global, toggle_site};
pub use file_store::FileStore;
pub use schedule::{PERIOD, ScheduleError, ScheduleOutcome, check_schedule};
pub use settings::SettingsError;
