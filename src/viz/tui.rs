use std::{
    io::{self, stdout, Stdout},
    panic,
    thread::{self, ThreadId},
};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Switch to the alternate screen in raw mode
///
/// Must be called on the thread that draws the dashboard.
pub fn init() -> io::Result<Tui> {
    install_panic_hook(thread::current().id());
    execute!(stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

/// Give the terminal back to the shell
pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)
}

/// Whether the current thread is the one that took over the terminal
fn owns_terminal(owner: ThreadId) -> bool {
    thread::current().id() == owner
}

// The hook is process wide. Training threads panic inside `catch_unwind` while the
// dashboard keeps drawing, so only a panic on the drawing thread restores the terminal.
fn install_panic_hook(owner: ThreadId) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if owns_terminal(owner) {
            let _ = restore();
        }
        previous(info);
    }));
}
