use crate::diff::{FileStatus, LineKind};
use ratatui::style::{Color, Modifier, Style};

// ── Text colors ──
pub const DIM: Color = Color::DarkGray;
pub const BORDER: Color = Color::Rgb(68, 68, 68);

// ── Accent colors ──
pub const GREEN: Color = Color::Green;
pub const YELLOW: Color = Color::Yellow;
pub const RED: Color = Color::Red;
pub const CYAN: Color = Color::Cyan;

// ── Diff colors ──
pub const ADD_STAGED_BG: Color = Color::Rgb(16, 62, 40);
pub const DEL_STAGED_BG: Color = Color::Rgb(68, 16, 24);

pub fn dim_style() -> Style {
    Style::default().fg(DIM)
}

pub fn border_style() -> Style {
    Style::default().fg(BORDER)
}

pub fn active_file_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

pub fn key_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn hunk_header_style() -> Style {
    Style::default().fg(CYAN)
}

pub fn status_style(status: FileStatus) -> Style {
    match status {
        FileStatus::Modified => Style::default().fg(YELLOW),
        FileStatus::Deleted => Style::default().fg(RED),
        FileStatus::Untracked => Style::default().fg(GREEN),
    }
}

/// Style of a `[staged/total]` counter
pub fn counter_style(staged: usize, total: usize) -> Style {
    if total > 0 && staged == total {
        Style::default().fg(GREEN)
    } else if staged > 0 {
        Style::default().fg(YELLOW)
    } else {
        dim_style()
    }
}

pub fn line_style(kind: LineKind, staged: bool) -> Style {
    match (kind, staged) {
        (LineKind::Add, false) => Style::default().fg(GREEN),
        (LineKind::Add, true) => Style::default().fg(GREEN).bg(ADD_STAGED_BG),
        (LineKind::Remove, false) => Style::default().fg(RED),
        (LineKind::Remove, true) => Style::default().fg(RED).bg(DEL_STAGED_BG),
        (LineKind::Context, _) => dim_style(),
    }
}
