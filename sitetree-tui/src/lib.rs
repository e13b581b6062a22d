pub mod app;
pub mod ui;

pub use app::{Action, App, Hit};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use sitetree_core::config::{InitialExpansion, LayoutConfig};
use sitetree_core::tree::SiteTree;
use std::io;
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::debug;

/// Poll interval while a transition is running.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Poll interval while idle.
const IDLE_INTERVAL: Duration = Duration::from_millis(100);

/// Layout constants for a character grid: one row per sibling slot is too
/// tight for links, so siblings sit two rows apart.
pub fn cell_layout_config(expansion: InitialExpansion) -> LayoutConfig {
    LayoutConfig {
        node_spacing: 2.0,
        depth_spacing: 26.0,
        label_offset: 2.0,
        indicator_gap: 1.0,
        link_gap: 3.0,
        target_inset: 1.0,
        margin_top: 1.0,
        margin_right: 1.0,
        margin_bottom: 1.0,
        margin_left: 2.0,
        initial_expansion: expansion,
        ..LayoutConfig::default()
    }
}

/// Open `url` in the system browser without waiting for it.
pub fn open_url(url: &str) -> Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };

    command
        .arg(url)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to open {}", url))?;
    Ok(())
}

/// Run the interactive tree viewer until the user quits.
pub fn run(tree: SiteTree, config: LayoutConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(tree, config);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        let now = Instant::now();
        app.tick(now);
        terminal.draw(|f| ui::draw(f, app, now))?;

        let timeout = if app.is_animating() { FRAME_INTERVAL } else { IDLE_INTERVAL };
        if !event::poll(timeout)? {
            continue;
        }

        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => Action::None,
        };

        match action {
            Action::Quit => break,
            Action::Open(url) => {
                debug!("Opening {}", url);
                match open_url(&url) {
                    Ok(()) => app.set_status(format!("Opened {}", url)),
                    Err(e) => app.set_status(format!("✗ {}", e)),
                }
            }
            Action::None => {}
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
