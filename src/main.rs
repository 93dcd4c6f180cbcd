mod app;
mod braille;
mod ui;

use app::App;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pencilfloor::WidgetConfig;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pencilfloor")]
#[command(about = "Pencils attracting each other and drawing their trails in the terminal")]
struct Args {
    /// Surface width in braille dots (defaults to the terminal size)
    #[arg(long)]
    width: Option<f64>,

    /// Surface height in braille dots (defaults to the terminal size)
    #[arg(long)]
    height: Option<f64>,

    /// Pencil radius in dots
    #[arg(long = "pencil-size")]
    pencil_size: Option<f64>,

    /// Simulation step size (0-1)
    #[arg(short = 'k', long)]
    quickness: Option<f64>,

    /// Simulation steps per millisecond (0-1)
    #[arg(short = 'r', long = "instant-rate")]
    instant_rate: Option<f64>,

    /// JSON configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write debug logs to this file
    #[arg(long)]
    log: Option<PathBuf>,
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pencilfloor=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Config file named on the command line, or the default one if it exists
fn load_config(args: &Args) -> (WidgetConfig, Option<PathBuf>) {
    let path = args
        .config
        .clone()
        .or_else(|| WidgetConfig::default_path().filter(|path| path.exists()));
    let config = match &path {
        Some(path) => WidgetConfig::load_from_file(path).unwrap_or_else(|err| {
            warn!("could not read config {}: {}", path.display(), err);
            WidgetConfig::default()
        }),
        None => WidgetConfig::default(),
    };
    (config, path)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(log) = &args.log {
        init_logging(log)?;
    }

    let (mut config, config_path) = load_config(&args);
    config.width = args.width.or(config.width);
    config.height = args.height.or(config.height);
    config.pencil_size = args.pencil_size.or(config.pencil_size);
    config.quickness = args.quickness.or(config.quickness);
    config.instant_rate = args.instant_rate.or(config.instant_rate);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Fill the canvas area unless a size was requested
    let size = terminal.size()?;
    let frame_rect = ratatui::layout::Rect {
        x: 0,
        y: 0,
        width: size.width,
        height: size.height,
    };
    let (canvas_width, canvas_height) = ui::get_canvas_size(frame_rect);
    let (dots_width, dots_height) = braille::pixels_for_cells(canvas_width, canvas_height);
    config.width = config.width.or(Some(dots_width as f64));
    config.height = config.height.or(Some(dots_height as f64));

    let res = App::new(config, config_path)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))
        .and_then(|mut app| run_app(&mut terminal, &mut app));

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                // Only process Press events
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                    KeyCode::Char(' ') => app.toggle_play(),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.increase_rate(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.decrease_rate(),
                    KeyCode::Char(']') => app.increase_quickness(),
                    KeyCode::Char('[') => app.decrease_quickness(),
                    KeyCode::Char('h') | KeyCode::Char('H') => app.toggle_hidden(),
                    KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                    KeyCode::Char('s') | KeyCode::Char('S') => app.save_config(),
                    KeyCode::Char('?') => app.toggle_help(),
                    KeyCode::Esc if app.show_help => app.toggle_help(),
                    _ => {}
                }
            }
        }

        app.tick();
    }
}
