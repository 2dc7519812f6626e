//! CLI argument parsing via clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use vibe_theme::{AutomationMode, ClockTime};

/// Dark theme automation for web pages.
#[derive(Debug, Parser)]
#[command(name = "vibe", version)]
pub struct Args {
    /// Settings store file.
    #[arg(long = "store", env = "VIBE_STORE", default_value = "vibe-store.json", global = true)]
    pub store: PathBuf,
    
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show whether the theme would be active on a URL.
    Status {
        url: String,
        /// Override the detected OS color scheme.
        #[arg(long, value_enum)]
        os: Option<OsScheme>,
    },
    /// Flip the global on/off flag.
    Toggle,
    /// Add or remove a URL's site from the exclusion list.
    ToggleSite { url: String },
    /// Exclude a URL's site.
    Exclude { url: String },
    /// Set the sepia warmth (0-100).
    Warmth {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        value: u8,
    },
    /// Set the automation mode.
    Mode {
        #[arg(value_enum)]
        mode: ModeArg,
    },
    /// Set the scheduled window, as HH:MM HH:MM.
    Schedule { start: ClockTime, end: ClockTime },
    /// Run one schedule check now.
    CheckSchedule,
    /// Run the schedule check periodically.
    Watch,
    /// Print the synchronized settings as JSON.
    Export {
        /// Write to a file instead of stdout.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Load synchronized settings from a JSON file.
    Import { file: PathBuf },
    /// Theme an HTML file and print the result.
    Render {
        file: PathBuf,
        /// URL the document is treated as loaded from.
        #[arg(long, default_value = "about:blank")]
        url: String,
        #[arg(long, value_enum)]
        os: Option<OsScheme>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OsScheme {
    Dark,
    Light,
}

impl OsScheme {
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Manual,
    System,
    Scheduled,
}

impl From<ModeArg> for AutomationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Manual => AutomationMode::Manual,
            ModeArg::System => AutomationMode::System,
            ModeArg::Scheduled => AutomationMode::Scheduled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_default_store_path() {
        let args = Args::parse_from(["vibe", "toggle"]);
        assert_eq!(args.store, PathBuf::from("vibe-store.json"));
        assert!(matches!(args.command, Command::Toggle));
    }
    
    #[test]
    fn test_store_after_subcommand() {
        let args = Args::parse_from(["vibe", "exclude", "https://a.com", "--store", "/tmp/s.json"]);
        assert_eq!(args.store, PathBuf::from("/tmp/s.json"));
        assert!(matches!(args.command, Command::Exclude { ref url } if url == "https://a.com"));
    }
    
    #[test]
    fn test_schedule_times_parsed() {
        let args = Args::parse_from(["vibe", "schedule", "20:00", "06:30"]);
        let Command::Schedule { start, end } = args.command else {
            panic!("expected schedule");
        };
        assert_eq!(start.to_string(), "20:00");
        assert_eq!(end.minutes(), 390);
        assert!(Args::try_parse_from(["vibe", "schedule", "25:00", "06:30"]).is_err());
    }
    
    #[test]
    fn test_warmth_range() {
        assert!(Args::try_parse_from(["vibe", "warmth", "101"]).is_err());
        let args = Args::parse_from(["vibe", "warmth", "55"]);
        assert!(matches!(args.command, Command::Warmth { value: 55 }));
    }
    
    #[test]
    fn test_render_flags() {
        let args = Args::parse_from(["vibe", "render", "page.html", "--url", "https://a.com/", "--os", "dark"]);
        let Command::Render { file, url, os } = args.command else {
            panic!("expected render");
        };
        assert_eq!(file, PathBuf::from("page.html"));
        assert_eq!(url, "https://a.com/");
        assert_eq!(os, Some(OsScheme::Dark));
    }
}
