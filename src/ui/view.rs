use super::styles;
use crate::diff::ChangedFile;
use crate::selection::{DisplayLine, Selection};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const MIN_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 10;
const CURSOR_GUTTER: &str = " ▸ ";
const GUTTER: &str = "   ";
const STAGED_MARK: &str = " ✓";

/// Render the whole session screen
pub fn draw(f: &mut Frame, selection: &Selection) {
    let area = f.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        f.render_widget(
            Paragraph::new("Terminal too small").style(styles::dim_style()),
            area,
        );
        return;
    }

    let [main, status] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
    let [files, diff] = Layout::horizontal([
        Constraint::Length(file_pane_width(area.width)),
        Constraint::Min(1),
    ])
    .areas(main);

    render_files(f, files, selection);
    render_diff(f, diff, selection);
    render_status(f, status, selection);
}

/// 30% of the terminal, kept between 25 and 50 columns
fn file_pane_width(total: u16) -> u16 {
    let width = (usize::from(total) * 3 / 10).clamp(25, 50);
    u16::try_from(width).unwrap_or(50)
}

fn pane(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
        .border_style(styles::border_style())
        .title(title)
}

fn render_files(f: &mut Frame, area: Rect, selection: &Selection) {
    let block = pane(format!(" Files ({}) ", selection.files().len()));
    let inner = block.inner(area);
    let rows = usize::from(inner.height);
    let active = selection.file_index();
    let first = (active + 1).saturating_sub(rows);

    let lines: Vec<Line> = selection
        .files()
        .iter()
        .enumerate()
        .skip(first)
        .take(rows)
        .map(|(index, file)| {
            let line = file_row(file, usize::from(inner.width));
            if index == active {
                line.style(styles::active_file_style())
            } else {
                line
            }
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn file_row(file: &ChangedFile, width: usize) -> Line<'static> {
    let (staged, total) = file.staged_counts();
    let counter = format!("[{staged}/{total}]");
    // status char, two separating spaces, counter
    let path_width = width.saturating_sub(counter.chars().count() + 3);

    Line::from(vec![
        Span::styled(
            file.status.symbol().to_string(),
            styles::status_style(file.status),
        ),
        Span::raw(" "),
        Span::raw(truncate_left(&file.path, path_width)),
        Span::raw(" "),
        Span::styled(counter, styles::counter_style(staged, total)),
    ])
}

/// Keep the end of `text`, marking a cut with a leading `…`
fn truncate_left(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let tail: String = text.chars().skip(count - (max - 1)).collect();
    format!("…{tail}")
}

fn render_diff(f: &mut Frame, area: Rect, selection: &Selection) {
    let title = selection
        .current_file()
        .map(|file| format!(" {} ", file.path))
        .unwrap_or_default();
    let block = pane(title);
    let rows = usize::from(block.inner(area).height);

    let lines: Vec<Line> = selection
        .display_lines()
        .iter()
        .enumerate()
        .skip(selection.scroll_offset())
        .take(rows)
        .map(|(index, row)| {
            let gutter = if index == selection.cursor() {
                CURSOR_GUTTER
            } else {
                GUTTER
            };
            diff_row(selection, *row, gutter)
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn diff_row(selection: &Selection, row: DisplayLine, gutter: &'static str) -> Line<'static> {
    let mut spans = vec![Span::raw(gutter)];

    match row {
        DisplayLine::Header { .. } => {
            if let Some(hunk) = selection.hunk_at(row) {
                spans.push(Span::styled(hunk.header(), styles::hunk_header_style()));
            }
        }
        DisplayLine::Line { .. } => {
            if let Some(line) = selection.line_at(row) {
                let style = styles::line_style(line.kind, line.is_staged());
                spans.push(Span::styled(line.content.clone(), style));
                if line.is_staged() {
                    spans.push(Span::styled(STAGED_MARK, style));
                }
            }
        }
    }

    Line::from(spans)
}

fn render_status(f: &mut Frame, area: Rect, selection: &Selection) {
    let mut spans = Vec::new();
    for (key, label) in [
        ("j/k", "move"),
        ("C-j/C-k", "file"),
        ("Tab", "line"),
        ("S-Tab", "hunk"),
        ("Enter", "stage"),
        ("q", "quit"),
    ] {
        spans.push(Span::styled(format!(" {key}"), styles::key_style()));
        spans.push(Span::styled(format!(" {label} "), styles::dim_style()));
    }

    if !selection.files().is_empty() {
        let (staged, total) = selection
            .files()
            .iter()
            .map(ChangedFile::staged_counts)
            .fold((0, 0), |(s, t), (fs, ft)| (s + fs, t + ft));
        spans.push(Span::styled(
            format!(" {staged}/{total} lines staged"),
            styles::counter_style(staged, total),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
