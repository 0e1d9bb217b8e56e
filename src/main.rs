//! reeltimer - a random Hindi movie and five minutes on the clock
//!
//! # Usage
//!
//! ```bash
//! # Launch the game
//! reeltimer
//!
//! # CLI mode (for automation)
//! reeltimer pick --count 3 --json
//! reeltimer pool --page 2
//! ```

use std::io::{stdout, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedSender};

use reeltimer::api::MovieCatalog;
use reeltimer::app::{App, AppEvent, KeyResult, PosterProbe};
use reeltimer::cli::{Cli, Command, ExitCode, Output};
use reeltimer::commands;
use reeltimer::config::Config;
use reeltimer::logging;
use reeltimer::session::sinks::{AlarmSink, BellAlarm, NotificationLog, SilentAlarm, SoundAlarm};
use reeltimer::session::{MovieSession, Tick};
use reeltimer::ui;

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Input poll timeout; also bounds how late a tick is drawn
const TICK_RATE: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();

    if cli.is_cli_mode() {
        // CLI mode: execute command and exit
        logging::init_stderr(cli.quiet);
        let exit_code = run_cli(cli).await;
        Ok(exit_code.into())
    } else {
        // TUI mode: launch interactive interface
        run_tui(cli).await?;
        Ok(ExitCode::Success.into())
    }
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return output.error(e.to_string(), ExitCode::ConfigError),
    };
    let client = match commands::build_client(&config, cli.api_key.as_deref()) {
        Ok(client) => client,
        Err(e) => return output.error(e.to_string(), ExitCode::ConfigError),
    };

    match cli.command {
        Some(Command::Pick(cmd)) => commands::pick_cmd(cmd, client, &config, &output).await,

        Some(Command::Pool(cmd)) => commands::pool_cmd(cmd, client, &output).await,

        None => {
            // This shouldn't happen (handled by is_cli_mode check)
            ExitCode::Success
        }
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn build_alarm(config: &Config, no_alarm: bool) -> Box<dyn AlarmSink> {
    if no_alarm {
        return Box::new(SilentAlarm);
    }
    match &config.alarm_sound {
        Some(sound) => {
            let command = config
                .alarm_command
                .clone()
                .unwrap_or_else(|| SoundAlarm::default_command().to_string());
            Box::new(SoundAlarm::new(command, sound.clone()))
        }
        None => Box::new(BellAlarm),
    }
}

/// Run interactive TUI
async fn run_tui(cli: Cli) -> Result<()> {
    // Config problems are reported before the terminal is taken over
    let config = commands::load_config(cli.config.as_deref()).context("loading config")?;
    let client = commands::build_client(&config, cli.api_key.as_deref())?;

    if let Some(path) = config.log_file.clone().or_else(Config::default_log_file) {
        logging::init_file(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;
    }
    tracing::info!(language = %client.language(), "starting reeltimer");

    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let notifications = NotificationLog::new();
    let session = MovieSession::new(Arc::new(client))
        .with_ticks(tick_tx)
        .with_notifier(notifications.clone())
        .with_alarm(build_alarm(&config, cli.no_alarm))
        .with_policy(config.fetch_policy());

    // Warm the pool while the placeholder is on screen
    if let Some(fill) = session.prefill_job() {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::Prefilled(fill.run().await));
        });
    }

    let mut app = App::new(session, notifications);

    let mut terminal = init_terminal()?;

    let result = run_event_loop(&mut terminal, &mut app, tick_rx, event_tx, event_rx).await;

    // Always restore terminal, even on error
    app.session.shutdown();
    restore_terminal(&mut terminal)?;

    result
}

/// Main event loop - handles input, ticks and background results, renders UI
async fn run_event_loop(
    terminal: &mut Tui,
    app: &mut App,
    mut ticks: mpsc::UnboundedReceiver<Tick>,
    event_tx: UnboundedSender<AppEvent>,
    mut events: mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    while app.running {
        app.collect_notifications(Instant::now());

        // Render current state
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with timeout
        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (ignore releases on Windows)
                if key.kind == KeyEventKind::Press {
                    if let KeyResult::Fetch(job) = app.handle_key(key) {
                        let tx = event_tx.clone();
                        tokio::spawn(async move {
                            let _ = tx.send(AppEvent::Fetched(job.run().await));
                        });
                    }
                }
            }
        }

        while let Ok(tick) = ticks.try_recv() {
            app.session.on_tick(tick);
        }

        while let Ok(event) = events.try_recv() {
            if let Some(probe) = app.apply_event(event) {
                spawn_poster_probe(app.session.catalog(), probe, event_tx.clone());
            }
        }
    }

    Ok(())
}

fn spawn_poster_probe(
    catalog: Arc<dyn MovieCatalog>,
    probe: PosterProbe,
    tx: UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        let available = catalog.poster_available(&probe.poster_path).await;
        let _ = tx.send(AppEvent::Poster {
            id: probe.id,
            available,
        });
    });
}
