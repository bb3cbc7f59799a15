//! Unified diff model and parsing.
//!
//! A diff is read into [`Hunk`]s of classified [`Line`]s. Parsing is lenient
//! on purpose: unexpected input produces fewer (or no) hunks instead of an
//! error, so an interactive session is never aborted by odd formatting.

pub mod file;
pub mod hunk;

pub use file::{ChangedFile, FileStatus};
pub use hunk::{Hunk, Line, LineKind, parse_hunk_header};

const FILE_MARKER: &str = "diff --git ";
const HUNK_MARKER: &str = "@@";
const NO_NEWLINE_MARKER: &str = "\\ No newline";

/// Parse unified diff text into hunks.
///
/// Accepts either a single-file diff or a multi-file one; every
/// `diff --git` line starts a new file header, and header lines (`index`,
/// mode lines, `---`/`+++`) are skipped until the next `@@` line. The
/// `\ No newline at end of file` marker is dropped.
#[must_use]
pub fn parse_diff(text: &str) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current: Option<Hunk> = None;
    let mut in_header = true;

    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }

    for line in lines {
        if line.starts_with(FILE_MARKER) {
            hunks.extend(current.take());
            in_header = true;
        } else if line.starts_with(HUNK_MARKER) {
            hunks.extend(current.take());
            current = Some(Hunk::from_header(line));
            in_header = false;
        } else if in_header || line.starts_with(NO_NEWLINE_MARKER) {
            continue;
        } else if let Some(hunk) = current.as_mut() {
            hunk.lines.push(Line::parse(line));
        }
    }

    hunks.extend(current);
    hunks
}
