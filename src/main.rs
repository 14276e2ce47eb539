mod app;
mod config;
mod controller;
mod error;
mod notify;
mod ticker;
mod time_model;
mod ui;

use anyhow::Context;
use clap::{builder::PossibleValuesParser, Parser};
use crossterm::{
    event::{self, Event},
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{fs::OpenOptions, io, path::PathBuf, sync::Mutex, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::{handle_input, AppState, Now};
use config::{get_path, load_json, save_json, Config, CONFIG_FILE, LOG_FILE, THEMES};
use controller::Field;
use time_model::parse_datetime_local;

// ============================================================================
// Constants
// ============================================================================

/// Upper bound on how long the loop waits for input before redrawing.
const FRAME_RATE: Duration = Duration::from_millis(100);

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "🏆 hacktimer - A terminal countdown timer")]
struct Args {
    /// Start of the window, YYYY-MM-DDTHH:MM
    #[arg(short, long, value_parser = parse_time_arg)]
    start: Option<String>,
    /// End of the window, YYYY-MM-DDTHH:MM
    #[arg(short, long, value_parser = parse_time_arg)]
    end: Option<String>,
    /// Fill the window with N hours starting now
    #[arg(short = 'H', long, conflicts_with_all = ["start", "end"], value_parser = clap::value_parser!(u32).range(1..))]
    hours: Option<u32>,
    /// Start counting down immediately
    #[arg(short, long)]
    autostart: bool,
    #[arg(short = 't', long, value_parser = PossibleValuesParser::new(THEMES.iter().copied()))]
    theme: Option<String>,
    #[arg(long)]
    no_sound: bool,
    #[arg(long)]
    no_notify: bool,
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
    /// Config file to read instead of ./hacktimer/config.json
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the effective config to the config file and exit
    #[arg(long)]
    write_config: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(t) = &self.theme { config.theme = t.clone(); }
        if self.no_sound { config.sound_enabled = false; }
        if self.no_notify { config.notifications_enabled = false; }
    }

    /// Seeds the input fields from the command line.
    fn seed_window(&self, app: &mut AppState, now: Now) {
        if let Some(h) = self.hours {
            if let Err(e) = app.controller.quick_set(h, now.wall) {
                warn!("--hours rejected: {}", e);
                app.alert = Some(e.to_string());
            }
        }
        if let Some(s) = &self.start {
            app.controller.set_input(Field::Start, s.as_str());
        }
        if let Some(e) = &self.end {
            app.controller.set_input(Field::End, e.as_str());
            app.focus = Field::End;
        }
    }
}

fn parse_time_arg(s: &str) -> std::result::Result<String, String> {
    match parse_datetime_local(s) {
        Ok(Some(_)) => Ok(s.trim().to_string()),
        Ok(None) => Err("Time must not be empty".into()),
        Err(e) => Err(format!("Invalid time ({}), expected YYYY-MM-DDTHH:MM", e)),
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(level: &str) -> anyhow::Result<PathBuf> {
    let path = get_path(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hacktimer={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}

// ============================================================================
// Terminal
// ============================================================================

/// Leaves raw mode and the alternate screen when dropped, so every exit
/// path out of `main` hands back a usable shell.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal(&mut io::stdout()) {
            warn!("failed to restore terminal: {}", e);
        }
    }
}

fn restore_terminal<W: io::Write>(out: &mut W) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(out, LeaveAlternateScreen, Show)
}

// ============================================================================
// Main
// ============================================================================

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_path = init_logging(args.log_level())?;

    let config_path = args.config.clone().unwrap_or_else(|| get_path(CONFIG_FILE));
    let mut config = load_json::<Config>(&config_path);
    args.apply_overrides(&mut config);

    info!("Starting hacktimer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: file={}, theme={}, log={}", config_path.display(), config.theme, log_path.display());

    if args.write_config {
        save_json(&config_path, &config)
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let mut app = AppState::new(config);
    let now = Now::current();
    args.seed_window(&mut app, now);
    if args.autostart && app.alert.is_none() {
        app.toggle(now);
    }

    enable_raw_mode()?;
    let guard = TerminalGuard;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);
    drop(guard);

    info!("Shutdown complete");
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui::render_ui(f, app))?;

        let now = Now::current();
        let timeout = app
            .controller
            .until_next_tick(now.instant)
            .map_or(FRAME_RATE, |t| t.min(FRAME_RATE));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if handle_input(key, app, Now::current()) {
                    return Ok(());
                }
            }
        }

        app.update(Now::current());
    }
}
