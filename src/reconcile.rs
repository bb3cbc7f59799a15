//! Detect lines that are already staged in the index.
//!
//! The full diff (worktree against `HEAD`) and the cached diff (index against
//! `HEAD`) are produced by separate git invocations and may split hunks
//! differently, so lines are matched by content rather than position.

use crate::diff::{Hunk, LineKind};
use std::collections::HashMap;

/// Mark lines of `full` that also appear as changes in `cached`.
///
/// Every addition/removal of `cached` is counted by `(content, kind)`. Lines
/// of `full` are then visited in document order, and each one whose key has
/// remaining occurrences is marked staged, consuming one occurrence. A key
/// is therefore never matched more often than it appears in `cached`.
///
/// Identical text that is both already staged and newly changed cannot be
/// told apart; the earliest occurrences win.
pub fn mark_pre_staged(full: &mut [Hunk], cached: &[Hunk]) {
    let mut available: HashMap<LineKind, HashMap<&str, usize>> = HashMap::new();
    for line in cached.iter().flat_map(|hunk| hunk.stageable_lines()) {
        *available
            .entry(line.kind)
            .or_default()
            .entry(line.content.as_str())
            .or_default() += 1;
    }

    if available.is_empty() {
        return;
    }

    for line in full.iter_mut().flat_map(|hunk| hunk.lines.iter_mut()) {
        if !line.is_stageable() {
            continue;
        }
        let remaining = available
            .get_mut(&line.kind)
            .and_then(|by_content| by_content.get_mut(line.content.as_str()));
        if let Some(count) = remaining {
            if *count > 0 {
                *count -= 1;
                line.set_staged(true);
            }
        }
    }
}
