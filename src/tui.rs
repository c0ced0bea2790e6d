use std::io::{self, Stdout};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, warn};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;
use crate::error::Result;
use crate::ui;

/// Raw-mode, alternate-screen terminal that restores itself when dropped,
/// including on early `?` returns from the event loop.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    mouse_enabled: bool,
    restored: bool,
}

impl Tui {
    pub fn new(enable_mouse: bool) -> Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        if enable_mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            mouse_enabled: enable_mouse,
            restored: false,
        })
    }

    /// Draw one frame of the picker.
    pub fn draw(&mut self, app: &mut App) -> Result<()> {
        self.terminal.draw(|frame| ui::render(app, frame))?;
        Ok(())
    }

    /// Leave raw mode and the alternate screen. Safe to call more than once.
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        if self.mouse_enabled {
            execute!(self.terminal.backend_mut(), DisableMouseCapture)?;
        }
        terminal::disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("Failed to restore terminal: {e}");
        }
    }
}

/// Panic hook: put the terminal back, log the panic, then run the default hook.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        error!("panic: {panic_info}");
        original_hook(panic_info);
    }));
}
