//! vibe CLI - Main Entry Point

mod cli;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vibe_background::{FileStore, check_schedule, commands, settings, PERIOD};
use vibe_theme::{
    ColorScheme, FLUSH_DELAY, ManualColorScheme, PageSession, ReactiveController, ScheduleWindow,
    SiteIdentity, SystemColorScheme, is_active, is_restricted,
};

use cli::{Args, Command, OsScheme};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    
    // Initialize logging
    let filter = EnvFilter::try_from_env("VIBE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    
    smol::block_on(run(args))
}

fn os_prefers_dark(overridden: Option<OsScheme>) -> bool {
    match overridden {
        Some(scheme) => scheme.is_dark(),
        None => SystemColorScheme::detect().prefers_dark(),
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let store = FileStore::new(&args.store);
    tracing::debug!("Using store {}", store.path().display());
    
    match args.command {
        Command::Status { url, os } => {
            if is_restricted(&url) {
                println!("{url}: restricted page, never themed");
                return Ok(());
            }
            let snapshot = ReactiveController::load_snapshot(&store).await;
            let site = SiteIdentity::from_url(&url);
            let dark = os_prefers_dark(os);
            let active = is_active(&snapshot, &site, dark);
            println!("host:     {}", site.hostname().unwrap_or("-"));
            println!("mode:     {}", snapshot.automation_mode);
            println!("enabled:  {}", snapshot.global_enabled);
            println!("warmth:   {}", snapshot.warmth.value());
            println!("os dark:  {dark}");
            println!("active:   {active}");
        }
        Command::Toggle => {
            let outcome = commands::toggle_global(&store).await?;
            println!("{outcome:?}");
        }
        Command::ToggleSite { url } => {
            let outcome = commands::toggle_site(&store, &url).await?;
            println!("{outcome:?}");
        }
        Command::Exclude { url } => {
            let outcome = commands::exclude_site(&store, &url).await?;
            println!("{outcome:?}");
        }
        Command::Warmth { value } => {
            let warmth = commands::set_warmth(&store, i64::from(value)).await?;
            println!("warmth set to {}", warmth.value());
        }
        Command::Mode { mode } => {
            commands::set_automation_mode(&store, mode.into()).await?;
            println!("automation mode set to {}", vibe_theme::AutomationMode::from(mode));
        }
        Command::Schedule { start, end } => {
            commands::set_schedule(&store, ScheduleWindow { start, end }).await?;
            println!("schedule set to {start}-{end}");
        }
        Command::CheckSchedule => {
            let outcome = check_schedule(&store, chrono::Local::now().time()).await?;
            println!("{outcome:?}");
        }
        Command::Watch => {
            tracing::info!("Checking schedule every {}s", PERIOD.as_secs());
            let scheme = SystemColorScheme::detect();
            tracing::info!("OS prefers dark: {}", scheme.prefers_dark());
            loop {
                if let Err(e) = check_schedule(&store, chrono::Local::now().time()).await {
                    tracing::warn!("Schedule check failed: {}", e);
                }
                if scheme.refresh() {
                    tracing::info!("OS prefers dark: {}", scheme.prefers_dark());
                }
                smol::Timer::after(PERIOD).await;
            }
        }
        Command::Export { output } => {
            let json = settings::export(&store).await?;
            match output {
                Some(path) => smol::fs::write(&path, json).await
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Import { file } => {
            let json = smol::fs::read_to_string(&file).await
                .with_context(|| format!("reading {}", file.display()))?;
            let count = settings::import(&store, &json).await?;
            println!("imported {count} setting(s)");
        }
        Command::Render { file, url, os } => {
            let html = smol::fs::read_to_string(&file).await
                .with_context(|| format!("reading {}", file.display()))?;
            if is_restricted(&url) {
                println!("{html}");
                return Ok(());
            }
            let document = vibe_html::parse_document(&html, &url);
            let scheme = ManualColorScheme::new(os_prefers_dark(os));
            let mut session = PageSession::attach(document, store.clone(), scheme).await;
            session.advance(FLUSH_DELAY);
            tracing::info!(
                "Rendered {} (theme {})",
                file.display(),
                if session.controller().is_active() { "active" } else { "inactive" },
            );
            println!("{}", session.document().to_html());
        }
    }
    
    Ok(())
}
