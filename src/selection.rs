//! Cursor and selection state for an interactive staging session.
//!
//! The active file's hunks are flattened into [`DisplayLine`]s: one header
//! row per hunk followed by one row per diff line. Rows refer back into the
//! file by index, so they are rebuilt wholesale whenever the active file
//! changes and never outlive the structure they point into.

use crate::diff::{ChangedFile, Hunk, Line};

/// Rows reserved around the diff content (top border and status bar)
const CHROME_ROWS: u16 = 2;

/// One row of the flattened view of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayLine {
    /// Header row of the hunk at this index
    Header { hunk: usize },
    /// A diff line, addressed by hunk index and line index within the hunk
    Line { hunk: usize, line: usize },
}

impl DisplayLine {
    #[must_use]
    pub fn hunk(self) -> usize {
        match self {
            DisplayLine::Header { hunk } | DisplayLine::Line { hunk, .. } => hunk,
        }
    }

    #[must_use]
    pub fn is_header(self) -> bool {
        matches!(self, DisplayLine::Header { .. })
    }
}

/// Interactive session state: the changed files plus cursor and viewport.
///
/// Created from the loaded file list at session start and consumed with
/// [`Selection::into_files`] once the user commits. Every operation is total;
/// out-of-range positions turn operations into no-ops.
#[derive(Debug, Clone)]
pub struct Selection {
    files: Vec<ChangedFile>,
    file_index: usize,
    cursor: usize,
    scroll: usize,
    display: Vec<DisplayLine>,
    width: u16,
    height: u16,
}

impl Selection {
    /// Start a session on the first file, with the cursor on its first change
    #[must_use]
    pub fn new(files: Vec<ChangedFile>, width: u16, height: u16) -> Self {
        let mut selection = Selection {
            files,
            file_index: 0,
            cursor: 0,
            scroll: 0,
            display: Vec::new(),
            width,
            height,
        };
        selection.enter_file(0);
        selection
    }

    #[must_use]
    pub fn files(&self) -> &[ChangedFile] {
        &self.files
    }

    /// End the session, handing back the files with their staged flags
    #[must_use]
    pub fn into_files(self) -> Vec<ChangedFile> {
        self.files
    }

    #[must_use]
    pub fn file_index(&self) -> usize {
        self.file_index
    }

    #[must_use]
    pub fn current_file(&self) -> Option<&ChangedFile> {
        self.files.get(self.file_index)
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    #[must_use]
    pub fn display_lines(&self) -> &[DisplayLine] {
        &self.display
    }

    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Rows available for diff content, never less than one
    #[must_use]
    pub fn content_height(&self) -> usize {
        usize::from(self.height.saturating_sub(CHROME_ROWS).max(1))
    }

    /// Resolve a row to the hunk it belongs to
    #[must_use]
    pub fn hunk_at(&self, row: DisplayLine) -> Option<&Hunk> {
        self.current_file()?.hunks.get(row.hunk())
    }

    /// Resolve a row to its diff line; `None` for headers and stale rows
    #[must_use]
    pub fn line_at(&self, row: DisplayLine) -> Option<&Line> {
        match row {
            DisplayLine::Header { .. } => None,
            DisplayLine::Line { hunk, line } => {
                self.current_file()?.hunks.get(hunk)?.lines.get(line)
            }
        }
    }

    fn line_at_mut(&mut self, row: DisplayLine) -> Option<&mut Line> {
        match row {
            DisplayLine::Header { .. } => None,
            DisplayLine::Line { hunk, line } => self
                .files
                .get_mut(self.file_index)?
                .hunks
                .get_mut(hunk)?
                .lines
                .get_mut(line),
        }
    }

    fn is_stageable(&self, row: DisplayLine) -> bool {
        self.line_at(row).is_some_and(Line::is_stageable)
    }

    /// Flatten the active file into rows: a header per hunk, then its lines
    pub fn rebuild_display(&mut self) {
        self.display.clear();
        let Some(file) = self.files.get(self.file_index) else {
            return;
        };
        for (hunk_index, hunk) in file.hunks.iter().enumerate() {
            self.display.push(DisplayLine::Header { hunk: hunk_index });
            self.display
                .extend((0..hunk.lines.len()).map(|line| DisplayLine::Line {
                    hunk: hunk_index,
                    line,
                }));
        }
    }

    /// Index of the first addition/removal row, else the first non-header
    /// row, else 0
    #[must_use]
    pub fn first_stageable(&self) -> usize {
        self.display
            .iter()
            .position(|&row| self.is_stageable(row))
            .or_else(|| self.display.iter().position(|row| !row.is_header()))
            .unwrap_or(0)
    }

    /// Move to the next non-header row; no-op at the end
    pub fn move_down(&mut self) {
        let next = self
            .display
            .iter()
            .enumerate()
            .skip(self.cursor + 1)
            .find(|(_, row)| !row.is_header())
            .map(|(index, _)| index);
        if let Some(index) = next {
            self.cursor = index;
            self.clamp_scroll();
        }
    }

    /// Move to the previous non-header row; no-op at the start
    pub fn move_up(&mut self) {
        let end = self.cursor.min(self.display.len());
        let previous = self.display[..end].iter().rposition(|row| !row.is_header());
        if let Some(index) = previous {
            self.cursor = index;
            self.clamp_scroll();
        }
    }

    /// Flip the line under the cursor, then advance to the next change.
    ///
    /// Headers and context lines are left alone. The cursor stays put when
    /// no addition/removal follows.
    pub fn toggle_line(&mut self) {
        let Some(&row) = self.display.get(self.cursor) else {
            return;
        };
        match self.line_at_mut(row) {
            Some(line) if line.is_stageable() => line.toggle(),
            _ => return,
        }
        self.mark_touched();

        let next = self
            .display
            .iter()
            .enumerate()
            .skip(self.cursor + 1)
            .find(|&(_, &row)| self.is_stageable(row))
            .map(|(index, _)| index);
        if let Some(index) = next {
            self.cursor = index;
            self.clamp_scroll();
        }
    }

    /// Stage every change of the hunk under the cursor, or unstage them all
    /// when they are already all staged. The file counts as touched even if
    /// the hunk has nothing to stage.
    pub fn toggle_hunk(&mut self) {
        let Some(&row) = self.display.get(self.cursor) else {
            return;
        };
        let Some(hunk) = self
            .files
            .get_mut(self.file_index)
            .and_then(|file| file.hunks.get_mut(row.hunk()))
        else {
            return;
        };

        let lines: Vec<&mut Line> = hunk
            .lines
            .iter_mut()
            .filter(|line| line.is_stageable())
            .collect();
        let stage = lines.iter().any(|line| !line.is_staged());
        for line in lines {
            line.set_staged(stage);
        }
        self.mark_touched();
    }

    /// Switch to the next file; no-op on the last one
    pub fn next_file(&mut self) {
        if self.file_index + 1 < self.files.len() {
            self.enter_file(self.file_index + 1);
        }
    }

    /// Switch to the previous file; no-op on the first one
    pub fn prev_file(&mut self) {
        if self.file_index > 0 && self.file_index < self.files.len() {
            self.enter_file(self.file_index - 1);
        }
    }

    /// Update the viewport after a terminal resize
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp_scroll();
    }

    fn enter_file(&mut self, index: usize) {
        self.file_index = index;
        self.rebuild_display();
        self.scroll = 0;
        self.cursor = self.first_stageable();
        self.clamp_scroll();
    }

    fn mark_touched(&mut self) {
        if let Some(file) = self.files.get_mut(self.file_index) {
            file.touched = true;
        }
    }

    /// Keep the cursor row inside the visible window
    fn clamp_scroll(&mut self) {
        let height = self.content_height();
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        }
        if self.cursor >= self.scroll + height {
            self.scroll = self.cursor + 1 - height;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diff::{FileStatus, LineKind, parse_diff};
    use similar_asserts::assert_eq;

    fn two_files() -> Vec<ChangedFile> {
        vec![
            ChangedFile::new(
                "file1.go",
                FileStatus::Modified,
                parse_diff(
                    "@@ -1,3 +1,4 @@\n context\n+added1\n-removed1\n context2\n@@ -20,2 +21,3 @@\n ctx\n+added2\n",
                ),
            ),
            ChangedFile::untracked("file2.txt", "line1\nline2\n"),
        ]
    }

    fn selection() -> Selection {
        Selection::new(two_files(), 80, 24)
    }

    fn line(selection: &Selection, file: usize, hunk: usize, line: usize) -> &Line {
        &selection.files()[file].hunks[hunk].lines[line]
    }

    #[test]
    fn display_has_header_then_lines_per_hunk() {
        let selection = selection();
        assert_eq!(
            selection.display_lines(),
            &[
                DisplayLine::Header { hunk: 0 },
                DisplayLine::Line { hunk: 0, line: 0 },
                DisplayLine::Line { hunk: 0, line: 1 },
                DisplayLine::Line { hunk: 0, line: 2 },
                DisplayLine::Line { hunk: 0, line: 3 },
                DisplayLine::Header { hunk: 1 },
                DisplayLine::Line { hunk: 1, line: 0 },
                DisplayLine::Line { hunk: 1, line: 1 },
            ]
        );
        let second = selection.line_at(selection.display_lines()[1]).unwrap();
        assert_eq!(second.content, " context");
        assert_eq!(selection.line_at(DisplayLine::Header { hunk: 0 }), None);
    }

    #[test]
    fn cursor_starts_on_first_change() {
        let selection = selection();
        assert_eq!(selection.cursor(), 2);
        let row = selection.display_lines()[selection.cursor()];
        assert_eq!(selection.line_at(row).unwrap().kind, LineKind::Add);
    }

    #[test]
    fn first_stageable_falls_back_to_first_line() {
        let files = vec![ChangedFile::new(
            "ctx",
            FileStatus::Modified,
            parse_diff("@@ -1,2 +1,2 @@\n a\n b\n"),
        )];
        assert_eq!(Selection::new(files, 80, 24).cursor(), 1);
    }

    #[test]
    fn empty_session_is_inert() {
        let mut selection = Selection::new(Vec::new(), 80, 24);
        assert_eq!(selection.cursor(), 0);
        assert!(selection.display_lines().is_empty());
        selection.move_down();
        selection.move_up();
        selection.toggle_line();
        selection.toggle_hunk();
        selection.next_file();
        selection.prev_file();
        assert_eq!(selection.cursor(), 0);
        assert!(selection.current_file().is_none());
    }

    #[test]
    fn move_down_and_up() {
        let mut selection = selection();
        selection.move_up();
        assert_eq!(selection.cursor(), 1);
        selection.move_down();
        assert_eq!(selection.cursor(), 2);
        selection.move_down();
        assert_eq!(selection.cursor(), 3);
        selection.move_up();
        selection.move_up();
        assert_eq!(selection.cursor(), 1);
    }

    #[test]
    fn moves_skip_hunk_headers() {
        let mut selection = selection();
        for _ in 0..3 {
            selection.move_down();
        }
        assert_eq!(selection.cursor(), 6);
        selection.move_up();
        assert_eq!(selection.cursor(), 4);
    }

    #[test]
    fn moves_do_not_wrap() {
        let mut selection = selection();
        for _ in 0..20 {
            selection.move_down();
        }
        assert_eq!(selection.cursor(), 7);
        for _ in 0..20 {
            selection.move_up();
        }
        assert_eq!(selection.cursor(), 1);
    }

    #[test]
    fn toggle_line_stages_and_advances() {
        let mut selection = selection();
        selection.toggle_line();

        assert!(line(&selection, 0, 0, 1).is_staged());
        assert!(selection.files()[0].touched);
        assert_eq!(selection.cursor(), 3);
    }

    #[test]
    fn toggle_line_advances_across_hunks() {
        let mut selection = selection();
        selection.move_down(); // removed1
        selection.toggle_line();
        assert!(line(&selection, 0, 0, 2).is_staged());
        assert_eq!(selection.cursor(), 7);
    }

    #[test]
    fn toggle_line_stays_on_last_change() {
        let mut selection = selection();
        for _ in 0..10 {
            selection.move_down();
        }
        selection.toggle_line();
        assert!(line(&selection, 0, 1, 1).is_staged());
        assert_eq!(selection.cursor(), 7);

        selection.toggle_line();
        assert!(!line(&selection, 0, 1, 1).is_staged());
    }

    #[test]
    fn toggle_line_ignores_context() {
        let mut selection = selection();
        selection.move_up();
        selection.toggle_line();
        assert!(!selection.files()[0].touched);
        assert_eq!(selection.cursor(), 1);
    }

    #[test]
    fn toggle_hunk_stages_all_then_unstages_all() {
        let diff = "@@ -1,5 +1,5 @@\n c\n+a1\n-r1\n+a2\n-r2\n+a3\n c\n";
        let mut file = ChangedFile::new("f", FileStatus::Modified, parse_diff(diff));
        for index in [1, 2, 3] {
            file.hunks[0].lines[index].set_staged(true);
        }
        let mut selection = Selection::new(vec![file], 80, 24);

        selection.toggle_hunk();
        assert_eq!(selection.files()[0].hunks[0].staged_counts(), (5, 5));
        assert!(selection.files()[0].touched);

        selection.toggle_hunk();
        assert_eq!(selection.files()[0].hunks[0].staged_counts(), (0, 5));
    }

    #[test]
    fn toggle_hunk_only_affects_current_hunk() {
        let mut selection = selection();
        selection.toggle_hunk();
        assert_eq!(selection.files()[0].hunks[0].staged_counts(), (2, 2));
        assert_eq!(selection.files()[0].hunks[1].staged_counts(), (0, 1));
        assert_eq!(selection.cursor(), 2);
    }

    #[test]
    fn toggle_hunk_without_changes_still_touches() {
        let files = vec![ChangedFile::new(
            "ctx",
            FileStatus::Modified,
            parse_diff("@@ -1,2 +1,2 @@\n a\n b\n"),
        )];
        let mut selection = Selection::new(files, 80, 24);
        selection.toggle_hunk();
        assert!(selection.files()[0].touched);
        assert_eq!(selection.files()[0].staged_counts(), (0, 0));
    }

    #[test]
    fn next_and_prev_file() {
        let mut selection = selection();
        selection.move_down();
        selection.next_file();

        assert_eq!(selection.file_index(), 1);
        assert_eq!(selection.display_lines().len(), 3);
        assert_eq!(selection.cursor(), 1);
        assert_eq!(selection.scroll_offset(), 0);

        selection.next_file();
        assert_eq!(selection.file_index(), 1);

        selection.prev_file();
        assert_eq!(selection.file_index(), 0);
        assert_eq!(selection.cursor(), 2);

        selection.prev_file();
        assert_eq!(selection.file_index(), 0);
    }

    #[test]
    fn toggles_persist_across_file_switches() {
        let mut selection = selection();
        selection.toggle_line();
        selection.next_file();
        selection.prev_file();
        assert!(line(&selection, 0, 0, 1).is_staged());
        assert_eq!(selection.into_files()[0].staged_counts(), (1, 3));
    }

    #[test]
    fn scroll_follows_cursor() {
        let contents: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let files = vec![ChangedFile::untracked("big.txt", &contents)];
        let mut selection = Selection::new(files, 80, 12);
        assert_eq!(selection.content_height(), 10);

        for _ in 0..10 {
            selection.move_down();
        }
        assert_eq!(selection.cursor(), 11);
        assert_eq!(selection.scroll_offset(), 2);

        for _ in 0..10 {
            selection.move_up();
        }
        assert_eq!(selection.cursor(), 1);
        assert_eq!(selection.scroll_offset(), 1);
    }

    #[test]
    fn tiny_viewport_keeps_one_row() {
        let mut selection = selection();
        selection.resize(80, 1);
        assert_eq!(selection.content_height(), 1);
        selection.move_down();
        assert_eq!(selection.scroll_offset(), selection.cursor());
    }

    #[test]
    fn resize_reclamps_scroll() {
        let contents: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let mut selection = Selection::new(vec![ChangedFile::untracked("big.txt", &contents)], 80, 40);
        for _ in 0..20 {
            selection.move_down();
        }
        assert_eq!(selection.scroll_offset(), 0);

        selection.resize(80, 12);
        assert_eq!(selection.scroll_offset(), 12);
        assert_eq!(selection.size(), (80, 12));
    }
}
