use nom::{
    IResult, Parser,
    character::complete::digit1,
    combinator::{all_consuming, map_res},
};
use std::fmt::Write as _;

/// Classification of a single diff line by its marker byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Unchanged line (leading space, or anything that is not `+`/`-`)
    Context,
    /// Added line (leading `+`)
    Add,
    /// Removed line (leading `-`)
    Remove,
}

impl LineKind {
    /// Whether lines of this kind can be selected for staging
    #[must_use]
    pub fn is_stageable(self) -> bool {
        matches!(self, LineKind::Add | LineKind::Remove)
    }
}

/// A single line of a hunk.
///
/// `content` keeps the raw text including the marker byte, so a line can be
/// written back into a patch verbatim. The staged flag only ever holds for
/// [`LineKind::Add`] and [`LineKind::Remove`] lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub content: String,
    pub kind: LineKind,
    staged: bool,
}

impl Line {
    /// Classify a raw diff body line by its first byte
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let kind = match raw.as_bytes().first() {
            Some(b'+') => LineKind::Add,
            Some(b'-') => LineKind::Remove,
            _ => LineKind::Context,
        };
        Line {
            content: raw.to_string(),
            kind,
            staged: false,
        }
    }

    /// Builder-style variant of [`Line::set_staged`]
    #[must_use]
    pub fn with_staged(mut self, staged: bool) -> Self {
        self.set_staged(staged);
        self
    }

    #[must_use]
    pub fn is_stageable(&self) -> bool {
        self.kind.is_stageable()
    }

    #[must_use]
    pub fn is_staged(&self) -> bool {
        self.staged && self.is_stageable()
    }

    /// Set the staged flag. Ignored for context lines.
    pub fn set_staged(&mut self, staged: bool) {
        if self.is_stageable() {
            self.staged = staged;
        }
    }

    /// Flip the staged flag. Ignored for context lines.
    pub fn toggle(&mut self) {
        self.set_staged(!self.staged);
    }

    /// Text after the marker byte
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.get(1..).unwrap_or("")
    }
}

/// A single hunk from a unified diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunk {
    pub orig_start: u32,
    pub orig_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<Line>,
}

impl Hunk {
    /// Build an empty hunk from a `@@ -a,b +c,d @@` header line.
    ///
    /// Never fails: a malformed header yields zeroed positions.
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let (orig_start, orig_count, new_start, new_count) = parse_hunk_header(header);
        Hunk {
            orig_start,
            orig_count,
            new_start,
            new_count,
            lines: Vec::new(),
        }
    }

    /// Header text using the parsed positions and counts
    #[must_use]
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.orig_start, self.orig_count, self.new_start, self.new_count
        )
    }

    /// Lines that can be toggled (additions and removals)
    pub fn stageable_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|line| line.is_stageable())
    }

    /// Number of staged lines and number of stageable lines
    #[must_use]
    pub fn staged_counts(&self) -> (usize, usize) {
        self.stageable_lines().fold((0, 0), |(staged, total), line| {
            (staged + usize::from(line.is_staged()), total + 1)
        })
    }

    #[must_use]
    pub fn has_staged(&self) -> bool {
        self.stageable_lines().any(Line::is_staged)
    }

    /// Reconstruct this hunk keeping only the staged changes.
    ///
    /// Context lines and staged changes are kept as-is. Unstaged additions
    /// are dropped. Unstaged removals become context lines, because the line
    /// still exists after the patch is applied. The header keeps the original
    /// start positions but carries counts recomputed from the emitted lines.
    ///
    /// Returns `None` if no change in the hunk is staged.
    #[must_use]
    pub fn to_patch(&self) -> Option<String> {
        if !self.has_staged() {
            return None;
        }

        let mut body = String::new();
        let mut orig_count = 0u32;
        let mut new_count = 0u32;

        for line in &self.lines {
            match (line.kind, line.is_staged()) {
                (LineKind::Context, _) => {
                    body.push_str(&line.content);
                    orig_count += 1;
                    new_count += 1;
                }
                (LineKind::Add, true) => {
                    body.push_str(&line.content);
                    new_count += 1;
                }
                (LineKind::Add, false) => continue,
                (LineKind::Remove, true) => {
                    body.push_str(&line.content);
                    orig_count += 1;
                }
                (LineKind::Remove, false) => {
                    body.push(' ');
                    body.push_str(line.text());
                    orig_count += 1;
                    new_count += 1;
                }
            }
            body.push('\n');
        }

        if body.is_empty() {
            return None;
        }

        let mut patch = String::with_capacity(body.len() + 32);
        let _ = writeln!(
            patch,
            "@@ -{},{} +{},{} @@",
            self.orig_start, orig_count, self.new_start, new_count
        );
        patch.push_str(&body);
        Some(patch)
    }
}

/// Parse a hunk header into `(orig_start, orig_count, new_start, new_count)`.
///
/// Only the text between the first two `@@` markers is considered. Each
/// whitespace-separated token starting with `-` or `+` is read as
/// `start[,count]`; a missing count means 1. Fields that are not plain
/// numbers read as 0.
#[must_use]
pub fn parse_hunk_header(header: &str) -> (u32, u32, u32, u32) {
    let Some(ranges) = header.splitn(3, "@@").nth(1) else {
        return (0, 0, 0, 0);
    };

    let (mut orig_start, mut orig_count) = (0, 0);
    let (mut new_start, mut new_count) = (0, 0);

    for token in ranges.split_whitespace() {
        if let Some(range) = token.strip_prefix('-') {
            (orig_start, orig_count) = parse_range(range);
        } else if let Some(range) = token.strip_prefix('+') {
            (new_start, new_count) = parse_range(range);
        }
    }

    (orig_start, orig_count, new_start, new_count)
}

/// Parse `start[,count]`, with count defaulting to 1
fn parse_range(range: &str) -> (u32, u32) {
    match range.split_once(',') {
        Some((start, count)) => (parse_field(start), parse_field(count)),
        None => (parse_field(range), 1),
    }
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| digits.parse::<u32>()).parse(input)
}

/// A whole field must be a number; anything else reads as 0
fn parse_field(field: &str) -> u32 {
    all_consuming(number)
        .parse(field)
        .map(|(_, n)| n)
        .unwrap_or(0)
}
