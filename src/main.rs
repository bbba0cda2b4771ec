use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{io, path::PathBuf, time::Instant};

use pomo::app::{handle_input, App};
use pomo::config::Config;
use pomo::session_log::SessionLog;
use pomo::ui::render_ui;
use pomo::{dirs, Result, TICK_RATE};

#[derive(Parser)]
#[command(author, version, about = "🍅 pomo - A Terminal Pomodoro Timer")]
struct Args {
    /// Config file (default: the app data directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Session log file (default: the app data directory)
    #[arg(short, long)]
    log: Option<PathBuf>,
    #[arg(long)]
    no_sound: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(dirs::config_path);
    // An unreadable config is fatal; there is no sensible fallback.
    let config = Config::load(&config_path)?;

    let log = SessionLog::new(args.log.unwrap_or_else(dirs::log_path));
    let mut app = App::new(
        config,
        config_path,
        log,
        dirs::sounds_dir(),
        !args.no_sound,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let now = Instant::now();
        terminal.draw(|f| render_ui(f, app, now))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if handle_input(key, app, Instant::now()) {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.update(Instant::now());
            last_tick = Instant::now();
        }
    }
}
