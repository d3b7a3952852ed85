//! IPO terminal - track Indian IPOs from the command line
//!
//! A terminal UI application that displays live IPO listings with GMP and
//! subscription data, financial calculators, and an IPO academy. Market
//! data comes from a generative search API and is cached on disk for an
//! hour to control quota usage.

mod academy;
mod app;
mod cache;
mod cli;
mod data;
mod freshness;
mod tools;
mod ui;

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, View};
use cache::{CacheManager, Store};
use cli::{Cli, StartupConfig};
use data::GeminiClient;

/// Initializes tracing. The filter defaults to off so log output never
/// corrupts the TUI; set RUST_LOG (e.g. `RUST_LOG=ipoterm=debug`) to see
/// cache and feed events on stderr.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "off".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Restores the terminal before the default panic output prints, so a
/// crash never strands the shell in raw mode on the alternate screen.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    if app.is_loading && app.view == View::Tracker {
        render_loading(frame);
    } else {
        match app.view {
            View::Tracker => ui::render_tracker(frame, app),
            View::Tools => ui::render_tools(frame, app),
            View::Academy => ui::render_academy(frame, app),
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame, app);
    }
}

/// Renders a splash line while the first snapshot is being fetched
fn render_loading(frame: &mut ratatui::Frame) {
    use ratatui::{
        layout::{Alignment, Rect},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();
    let row = Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    };

    frame.render_widget(
        Paragraph::new("Scanning the primary market...")
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center),
        row,
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli_args = Cli::parse();
    let mut config = StartupConfig::from_cli(&cli_args)?;

    init_tracing();
    setup_panic_hook();

    // Wire the store, feed, and cache manager
    let store = match &config.data_dir {
        Some(dir) => Store::with_dir(dir.clone()),
        None => Store::open().ok_or("could not determine a cache directory")?,
    };
    let api_key = if config.offline {
        None
    } else {
        std::env::var("GEMINI_API_KEY").ok()
    };
    // Without a key the feed resolves empty and the cache degrades;
    // treat that like --offline so no banner nags about it
    config.offline = api_key.is_none();
    let feed = Arc::new(GeminiClient::new(api_key));
    let manager = CacheManager::new(store.clone(), feed);
    let mut app = App::new(manager, store, &config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Draw the splash once, then block on the first load;
    // --force-refresh bypasses the cache window here
    terminal.draw(|f| render_ui(f, &app))?;
    app.load_ipos(false, config.force_refresh).await;

    loop {
        terminal.draw(|f| render_ui(f, &app))?;

        // 100 ms poll keeps the countdown smooth without spinning
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // Advance the freshness countdown (once per second internally)
        app.maybe_tick(Utc::now().timestamp_millis());

        if app.take_refresh_request() {
            app.load_ipos(false, true).await;
        }
        if app.take_auto_refresh() {
            // Unforced on purpose: the expired window already makes the
            // cache manager refetch, no need to bypass it
            app.load_ipos(true, false).await;
        }
        if app.take_insight_request() {
            app.load_insight().await;
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
