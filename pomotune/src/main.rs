use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pomotune_core::SessionConfig;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};

mod app;
mod config;
mod logging;
mod playback;
mod setup;
mod ui;

use app::{App, AppMode};
use config::{Config, SPOTIFY_TOKEN_ENV};
use playback::{Disconnected, Playback, PlaybackCommand, SpotifyClient};

#[derive(Parser)]
#[command(name = "pomotune")]
#[command(about = "Pomodoro timer that pauses your music when focus ends", long_about = None)]
struct Cli {
    /// Focus interval length in minutes
    #[arg(long)]
    focus: Option<u32>,
    /// Short break length in minutes
    #[arg(long)]
    short_break: Option<u32>,
    /// Long break length in minutes
    #[arg(long)]
    long_break: Option<u32>,
    /// Take a long break after this many focus intervals
    #[arg(long)]
    break_interval: Option<u32>,
    /// Number of focus intervals
    #[arg(long)]
    sessions: Option<u32>,
    /// Read settings from this file instead of the per-user config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Skip the setup screen
    #[arg(long)]
    start: bool,
    /// Do not talk to Spotify even if a token is configured
    #[arg(long)]
    no_spotify: bool,
}

impl Cli {
    fn session_config(&self, config: &Config) -> SessionConfig {
        let defaults: SessionConfig = config.session.into();
        SessionConfig {
            focus_duration: self.focus.unwrap_or(defaults.focus_duration),
            short_break_duration: self.short_break.unwrap_or(defaults.short_break_duration),
            long_break_duration: self.long_break.or(defaults.long_break_duration),
            break_interval: self.break_interval.unwrap_or(defaults.break_interval),
            total_sessions: self.sessions.unwrap_or(defaults.total_sessions),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = logging::init_tracing()?;
    let config = config::load_config(cli.config.as_deref())?;
    info!(log = ?log_path, "pomotune starting");

    // Only the playback worker runs here; the UI loop stays on this thread.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let playback = connect_playback(&cli, &config, runtime.handle());
    let initial = cli.session_config(&config);
    let mut app = App::new(config, initial, playback);
    if cli.start {
        app.begin_session();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Exited with error: {:?}", err);
        eprintln!("Error: {:?}", err);
    }

    runtime.shutdown_timeout(Duration::from_millis(500));
    Ok(())
}

fn connect_playback(
    cli: &Cli,
    config: &Config,
    runtime: &tokio::runtime::Handle,
) -> Box<dyn Playback> {
    if cli.no_spotify || !config.spotify.enabled {
        info!("Spotify integration disabled");
        return Box::new(Disconnected);
    }
    let Some(token) = config
        .spotify
        .resolve_token(std::env::var(SPOTIFY_TOKEN_ENV).ok())
    else {
        info!("No Spotify access token, running without playback control");
        return Box::new(Disconnected);
    };

    let client = SpotifyClient::new(config.spotify.api_base.clone(), token);
    let poll_every = Duration::from_secs(config.spotify.poll_interval_secs.max(1));
    Box::new(playback::spawn(runtime, client, poll_every))
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();
        let frame_time = now.duration_since(last_frame);
        last_frame = now;
        terminal.draw(|f| ui::draw(f, app, frame_time))?;

        app.tick_due(Instant::now());

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.mode {
                        AppMode::Setup => match key.code {
                            KeyCode::Char('q') => app.should_quit = true,
                            KeyCode::Up | KeyCode::Char('k') => app.setup.move_up(),
                            KeyCode::Down | KeyCode::Char('j') => app.setup.move_down(),
                            KeyCode::Left | KeyCode::Char('-') | KeyCode::Char('h') => {
                                app.setup.decrement()
                            }
                            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('l') => {
                                app.setup.increment()
                            }
                            KeyCode::Enter => app.begin_session(),
                            _ => {}
                        },
                        AppMode::Timer => match key.code {
                            KeyCode::Char('q') => app.should_quit = true,
                            KeyCode::Esc => app.leave_session(),
                            KeyCode::Char(' ') => app.toggle(Instant::now()),
                            KeyCode::Char('s') => app.start(Instant::now()),
                            KeyCode::Char('p') => app.stop(),
                            KeyCode::Char('r') => app.restart(),
                            KeyCode::Char('P') => app.toggle_playback(),
                            KeyCode::Char('n') => app.send_playback(PlaybackCommand::Next),
                            KeyCode::Char('b') => app.send_playback(PlaybackCommand::Previous),
                            _ => {}
                        },
                    }
                }
            }
        }

        if app.should_quit {
            info!("Quitting");
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_defaults() {
        let cli = Cli::parse_from(["pomotune", "--focus", "50", "--sessions", "2"]);
        let session = cli.session_config(&Config::default());
        assert_eq!(session.focus_duration, 50);
        assert_eq!(session.total_sessions, 2);
        assert_eq!(session.short_break_duration, 10);
        assert_eq!(session.long_break_duration, Some(20));
        assert_eq!(session.break_interval, 2);
    }

    #[test]
    fn flags_are_not_clamped() {
        let cli = Cli::parse_from(["pomotune", "--short-break", "45", "--break-interval", "9"]);
        let session = cli.session_config(&Config::default());
        assert_eq!(session.short_break_duration, 45);
        assert_eq!(session.break_interval, 9);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
