//! Terminal front end of a staging session.

mod input;
mod styles;
mod view;

pub use input::Action;
pub use view::draw;

use crate::GitStageError;
use crate::selection::Selection;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fmt::Display;
use std::io::{self, Stdout};
use tracing::{debug, info};

/// How the user ended the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Write the selection to the index
    Commit,
    /// Leave the index untouched
    Abort,
}

fn terminal_error(err: impl Display) -> GitStageError {
    GitStageError::Terminal {
        message: err.to_string(),
    }
}

/// Run the interactive session until the user commits or aborts.
///
/// The terminal is switched to raw mode and the alternate screen for the
/// duration of the call and restored before returning, on error as well.
pub fn run(selection: &mut Selection) -> Result<Outcome, GitStageError> {
    enable_raw_mode().map_err(terminal_error)?;
    let mut stdout = io::stdout();
    if let Err(err) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(terminal_error(err));
    }

    let result = Terminal::new(CrosstermBackend::new(stdout))
        .map_err(terminal_error)
        .and_then(|mut terminal| {
            let result = event_loop(&mut terminal, selection);
            let _ = terminal.show_cursor();
            result
        });

    let restored = restore();
    let outcome = result?;
    restored?;
    info!(?outcome, "session ended");
    Ok(outcome)
}

fn restore() -> Result<(), GitStageError> {
    let raw = disable_raw_mode();
    execute!(io::stdout(), LeaveAlternateScreen).map_err(terminal_error)?;
    raw.map_err(terminal_error)
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    selection: &mut Selection,
) -> Result<Outcome, GitStageError> {
    let size = terminal.size().map_err(terminal_error)?;
    selection.resize(size.width, size.height);

    loop {
        terminal
            .draw(|f| draw(f, selection))
            .map_err(terminal_error)?;

        match event::read().map_err(terminal_error)? {
            Event::Key(key) => {
                let Some(action) = Action::from_key(key) else {
                    continue;
                };
                debug!(?action, "key");
                if let Some(outcome) = action.apply(selection) {
                    return Ok(outcome);
                }
            }
            Event::Resize(width, height) => selection.resize(width, height),
            _ => {}
        }
    }
}
