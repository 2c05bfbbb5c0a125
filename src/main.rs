mod app;
mod draw;
mod keys;
mod season;
mod sim;
mod standings;
mod state;
mod ui;

use crate::app::App;
use crate::season::Season;
use crate::standings::StandingsFile;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::FeedTone;
use crate::state::messages::UiEvent;
use crate::state::refresher::AutoplayTicker;
use anyhow::Context;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::warn;
use playoff_engine::PlayoffEvent;
use std::fs::OpenOptions;
use std::io::Stdout;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};
use tui_logger::TuiLoggerFile;

#[derive(Debug, PartialEq)]
enum CliCommand {
    Run,
    Help,
    Version,
    Simulate { save: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(command) = handle_cli_args() else {
        return Ok(());
    };

    better_panic::install();

    let settings = AppSettings::load();
    init_logging(&settings)?;

    if let CliCommand::Simulate { save } = command {
        return run_headless(&settings, save.as_deref());
    }

    let autoplay_interval = settings.autoplay_interval;

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (playoff_event_tx, playoff_event_rx) = mpsc::unbounded_channel::<PlayoffEvent>();

    // Standings problems surface here, before the terminal is taken over.
    let app = Arc::new(Mutex::new(App::new(settings, playoff_event_tx)?));

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Autoplay ticks; ignored unless autoplay is on
    let ticker = AutoplayTicker::new(ui_event_tx.clone(), autoplay_interval);
    let ticker_task = tokio::spawn(ticker.run());

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, playoff_event_rx).await;

    input_handler.abort();
    ticker_task.abort();
    cleanup_terminal();

    Ok(())
}

/// Prints help or version and returns `None`, or returns the mode to run.
fn handle_cli_args() -> Option<CliCommand> {
    let command = match parse_cli_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    match command {
        CliCommand::Help => {
            println!("{}", usage_text());
            None
        }
        CliCommand::Version => {
            println!("playoff-tui {}", env!("CARGO_PKG_VERSION"));
            None
        }
        command => Some(command),
    }
}

/// tui-logger is the `log` backend in both modes. The TUI shows it in the
/// log pane; `PLAYOFF_LOG_FILE` also sends it to a file.
fn init_logging(settings: &AppSettings) -> anyhow::Result<()> {
    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);
    if let Some(level) = settings.log_level {
        log::set_max_level(level);
        tui_logger::set_default_level(level);
    }

    if let Some(path) = &settings.log_file {
        // TuiLoggerFile panics if it cannot open the file.
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tui_logger::set_log_file(TuiLoggerFile::new(&path.to_string_lossy()));
    }

    for warning in &settings.warnings {
        warn!("{warning}");
    }
    Ok(())
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<CliCommand, String> {
    let mut args = args.into_iter();
    let Some(arg) = args.next() else {
        return Ok(CliCommand::Run);
    };

    match arg.as_str() {
        "-h" | "--help" => Ok(CliCommand::Help),
        "-V" | "--version" => Ok(CliCommand::Version),
        "--simulate" => {
            let save = match args.next().as_deref() {
                None => None,
                Some("--save") => {
                    let Some(path) = args.next() else {
                        return Err("--save needs a path".to_string());
                    };
                    Some(PathBuf::from(path))
                }
                Some(other) => return Err(format!("Unknown argument: {other}")),
            };
            if let Some(extra) = args.next() {
                return Err(format!("Unknown argument: {extra}"));
            }
            Ok(CliCommand::Simulate { save })
        }
        "--save" => Err("--save only works with --simulate".to_string()),
        _ => Err(format!("Unknown argument: {arg}")),
    }
}

fn usage_text() -> &'static str {
    "playoff-tui - NBA play-in and playoffs in your terminal

Usage:
  playoff-tui
  playoff-tui --simulate [--save <path>]
  playoff-tui --help
  playoff-tui --version

Environment:
  PLAYOFF_STANDINGS_JSON   Path to a standings file (default: bundled 2025 standings)
  PLAYOFF_SEED             Simulator seed (default 2025)
  PLAYOFF_SAVE_PATH        Snapshot path (default $XDG_CONFIG_HOME/playoff-tui/playoffs_<season>.json)
  PLAYOFF_SKIP_PLAY_IN     Set to 1 to seed 7 and 8 straight from the standings
  PLAYOFF_AUTOPLAY_MS      Delay between autoplayed games (default 600)
  PLAYOFF_LOG_FILE         Also append log records to this file
  RUST_LOG                 Log level (default error)"
}

/// Plays a whole tournament without the terminal UI and prints the results.
fn run_headless(settings: &AppSettings, save: Option<&Path>) -> anyhow::Result<()> {
    let standings = StandingsFile::load(settings.standings_path.as_deref())?;
    let teams = standings.directory();
    let year = standings.season;

    let mut season = Season::new(standings, settings.seed, settings.play_in_enabled);
    season.subscribe(move |event: &PlayoffEvent| {
        let (tone, text) = app::describe_event(event, &teams, year);
        if tone != FeedTone::Game {
            println!("{text}");
        }
    });
    season.start()?;
    let played = season.run_to_completion()?;

    println!("\n{played} games played (seed {})\n", settings.seed);
    for line in season.summary() {
        println!("{line}");
    }

    if let Some(path) = save {
        season.save(path)?;
        println!("\nSaved to {}", path.display());
    }

    // Hand the last records to the log file before exiting.
    tui_logger::move_events();
    Ok(())
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    mut playoff_events: mpsc::UnboundedReceiver<PlayoffEvent>,
) {
    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app).await;
                if should_redraw {
                    let app_guard = app.lock().await;
                    draw::draw(&mut terminal, &app_guard);
                }
            }

            Some(event) = playoff_events.recv() => {
                let mut app_guard = app.lock().await;
                app_guard.on_playoff_event(event);
                // A finished round arrives as a burst; draw once.
                while let Ok(event) = playoff_events.try_recv() {
                    app_guard.on_playoff_event(event);
                }
                draw::draw(&mut terminal, &app_guard);
            }

            else => break,
        }
    }
}

async fn handle_ui_event(ui_event: UiEvent, app: &Arc<Mutex<App>>) -> bool {
    match ui_event {
        UiEvent::AppStarted => true,
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::AutoplayTick => app.lock().await.on_autoplay_tick(),
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, where there is nobody left
/// to report a failure to.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliCommand, String> {
        parse_cli_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_arguments_runs_the_ui() {
        assert_eq!(parse(&[]), Ok(CliCommand::Run));
        assert_eq!(parse(&["--help"]), Ok(CliCommand::Help));
        assert_eq!(parse(&["-V"]), Ok(CliCommand::Version));
    }

    #[test]
    fn simulate_takes_an_optional_save_path() {
        assert_eq!(parse(&["--simulate"]), Ok(CliCommand::Simulate { save: None }));
        assert_eq!(
            parse(&["--simulate", "--save", "out.json"]),
            Ok(CliCommand::Simulate { save: Some(PathBuf::from("out.json")) })
        );
        assert!(parse(&["--simulate", "--save"]).is_err());
        assert!(parse(&["--simulate", "--fast"]).is_err());
        assert!(parse(&["--simulate", "--save", "a.json", "b.json"]).is_err());
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(parse(&["--save", "out.json"]).is_err());
        assert!(parse(&["--bracket"]).is_err());
    }
}
