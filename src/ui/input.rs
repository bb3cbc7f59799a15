use super::Outcome;
use crate::selection::Selection;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveDown,
    MoveUp,
    NextFile,
    PrevFile,
    ToggleLine,
    ToggleHunk,
    Commit,
    Abort,
}

impl Action {
    /// Decode a key event; releases, repeats and unbound keys yield `None`
    #[must_use]
    pub fn from_key(key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Char('j') if ctrl => Action::NextFile,
            KeyCode::Char('k') if ctrl => Action::PrevFile,
            KeyCode::Char('c') if ctrl => Action::Abort,
            KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
            KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
            KeyCode::Tab => Action::ToggleLine,
            KeyCode::BackTab => Action::ToggleHunk,
            KeyCode::Enter => Action::Commit,
            KeyCode::Esc | KeyCode::Char('q') => Action::Abort,
            _ => return None,
        };
        Some(action)
    }

    /// Apply the action; returns an outcome once the session should end
    pub fn apply(self, selection: &mut Selection) -> Option<Outcome> {
        match self {
            Action::MoveDown => selection.move_down(),
            Action::MoveUp => selection.move_up(),
            Action::NextFile => selection.next_file(),
            Action::PrevFile => selection.prev_file(),
            Action::ToggleLine => selection.toggle_line(),
            Action::ToggleHunk => selection.toggle_hunk(),
            Action::Commit => return Some(Outcome::Commit),
            Action::Abort => return Some(Outcome::Abort),
        }
        None
    }
}
