//! `gramfeed` command-line entry point.
//!
//! * `gramfeed serve` — run the HTTP API.
//! * `gramfeed scrape` — run one scrape cycle and exit.
//! * `gramfeed` / `gramfeed browse` — open the terminal post browser.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Handle;

use gramfeed::app::App;
use gramfeed::input::{self, Action};
use gramfeed::refresh::{self, RefreshRequest};
use gramfeed::{build_scraper, logging, ui, web, Config, GramfeedError, Scraper};

/// Default configuration file, read only if present.
const DEFAULT_CONFIG: &str = "gramfeed.toml";

#[derive(Parser)]
#[command(name = "gramfeed", version, about = "Instagram channel RSS aggregator")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve,
    /// Fetch every configured feed once and merge new posts.
    Scrape,
    /// Browse stored posts in the terminal.
    Browse,
}

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen. When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before printing a panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(&path)?,
        None => Config::load_or_default(DEFAULT_CONFIG)?,
    };
    Ok(config)
}

async fn run_scrape(scraper: Scraper) -> Result<()> {
    match scraper.run().await {
        Ok(added) => {
            println!("{added} new posts");
            Ok(())
        }
        Err(GramfeedError::NoFeedSources) => {
            anyhow::bail!("no RSS feed URLs are configured; add rss.app feed URLs to the channel file")
        }
        Err(e) => Err(e).context("scrape failed"),
    }
}

/// The terminal browser's event loop. Blocking; run off the async workers.
fn run_browser(runtime: Handle, scraper: Scraper) -> Result<()> {
    install_panic_hook();

    let (refresh_tx, mut refresh_rx) = refresh::spawn(&runtime, scraper);

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // Runs at ~10 fps (100 ms tick). Each iteration:
    //   1. Drain any messages from the refresh worker.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = refresh_rx.try_recv() {
            refresh::apply(&mut app, msg);
        }

        let now = Utc::now();
        guard.terminal.draw(|f| ui::draw(&mut app, f, now))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if input::handle_key_event(&mut app, key) == Some(Action::Refresh)
                    && refresh_tx.send(RefreshRequest).is_err()
                {
                    app.fail_refresh("refresh worker stopped");
                }
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    let command = cli.command.unwrap_or(Command::Browse);

    match command {
        Command::Serve => {
            logging::init_console(&config.logging.level);
            let scraper = build_scraper(&config);
            web::serve(&config.bind_addr(), scraper)
                .await
                .with_context(|| format!("failed to serve on {}", config.bind_addr()))?;
        }
        Command::Scrape => {
            logging::init_console(&config.logging.level);
            run_scrape(build_scraper(&config)).await?;
        }
        Command::Browse => {
            logging::init_file(&config.logging)
                .with_context(|| format!("failed to open log file {}", config.logging.file.display()))?;
            let scraper = build_scraper(&config);
            let runtime = Handle::current();
            tokio::task::spawn_blocking(move || run_browser(runtime, scraper)).await??;
        }
    }

    Ok(())
}
