mod app;
mod config;
mod engine;
mod error;
mod event;
mod games;
mod scores;
mod ui;

use std::io;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use app::App;
use config::{Cli, Config};
use event::{Event, EventHandler};
use scores::{BestScores, JsonFileStore};

/// Restore terminal state - called on panic or unexpected exit
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

/// Logs go to a file; stdout belongs to the TUI.
fn init_logging(config: &Config) {
    let writer = dirs::data_local_dir()
        .map(|dir| dir.join("festplay"))
        .and_then(|dir| {
            std::fs::create_dir_all(&dir).ok()?;
            std::fs::File::create(dir.join("festplay.log")).ok()
        })
        .map_or_else(|| BoxMakeWriter::new(io::sink), |file| BoxMakeWriter::new(Mutex::new(file)));

    let default = config
        .log_level
        .parse::<Directive>()
        .unwrap_or_else(|_| LevelFilter::INFO.into());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder().with_default_directive(default).from_env_lossy())
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

fn open_scores(config: &Config) -> BestScores {
    if !config.persist {
        info!("best scores kept for this session only");
        return BestScores::session_only();
    }
    match config.scores_path.clone().or_else(JsonFileStore::default_path) {
        Some(path) => {
            let store = JsonFileStore::new(path);
            info!(path = %store.path().display(), "best scores file");
            BestScores::new(Box::new(store))
        }
        None => {
            warn!("no data directory, best scores kept for this session only");
            BestScores::session_only()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli).context("loading configuration")?;
    init_logging(&config);
    info!(version = env!("CARGO_PKG_VERSION"), seed = ?config.seed, "starting festplay");

    let scores = open_scores(&config);

    // Set up panic hook to restore terminal state
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    // Without release events every press counts as a fresh one.
    let tracks_release = supports_keyboard_enhancement().unwrap_or(false);
    if tracks_release {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    info!(tracks_release, "terminal ready");

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(&config, scores, tracks_release);
    let event_handler = EventHandler::new(config.frame());

    let result = run(&mut terminal, &mut app, &event_handler);

    restore_terminal();
    terminal.show_cursor()?;
    info!("bye");
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        let event = events.next()?;
        // Wall time advances on every event so a stream of key presses cannot starve the games.
        app.on_tick();
        match event {
            Event::Tick => {}
            Event::Key(key) => app.on_key(key),
            Event::Mouse(mouse) => app.on_mouse(mouse),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
