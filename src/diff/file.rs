use super::hunk::{Hunk, Line};
use std::fmt;

/// Working tree status of a changed path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Modified,
    Deleted,
    Untracked,
}

impl FileStatus {
    /// One-character marker shown in the file list
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Untracked => '?',
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Modified => f.write_str("modified"),
            FileStatus::Deleted => f.write_str("deleted"),
            FileStatus::Untracked => f.write_str("untracked"),
        }
    }
}

/// One changed path with its hunks and selection state.
///
/// `touched` is set once the user toggles anything in the file; untouched
/// files are left alone when the selection is written back to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
    pub hunks: Vec<Hunk>,
    pub touched: bool,
}

impl ChangedFile {
    #[must_use]
    pub fn new(path: impl Into<String>, status: FileStatus, hunks: Vec<Hunk>) -> Self {
        ChangedFile {
            path: path.into(),
            status,
            hunks,
            touched: false,
        }
    }

    /// Build an untracked file whose whole content is one addition hunk.
    ///
    /// The content is split on `\n`; a trailing empty piece left by a final
    /// newline is dropped. Empty content yields no hunks.
    #[must_use]
    pub fn untracked(path: impl Into<String>, contents: &str) -> Self {
        let mut lines: Vec<&str> = contents.split('\n').collect();
        if lines.last() == Some(&"") {
            lines.pop();
        }

        let hunks = if lines.is_empty() {
            Vec::new()
        } else {
            vec![Hunk {
                orig_start: 0,
                orig_count: 0,
                new_start: 1,
                new_count: lines.len() as u32,
                lines: lines
                    .iter()
                    .map(|line| Line::parse(&format!("+{line}")))
                    .collect(),
            }]
        };

        ChangedFile::new(path, FileStatus::Untracked, hunks)
    }

    /// Number of staged lines and number of stageable lines across all hunks
    #[must_use]
    pub fn staged_counts(&self) -> (usize, usize) {
        self.hunks
            .iter()
            .map(Hunk::staged_counts)
            .fold((0, 0), |(staged, total), (s, t)| (staged + s, total + t))
    }

    /// Build a patch containing only the staged lines of this file.
    ///
    /// Returns `None` when nothing is staged; the caller must then skip
    /// applying instead of sending an empty patch.
    #[must_use]
    pub fn to_patch(&self) -> Option<String> {
        let hunks: Vec<String> = self.hunks.iter().filter_map(Hunk::to_patch).collect();
        if hunks.is_empty() {
            return None;
        }

        let mut patch = self.patch_header();
        for hunk in hunks {
            patch.push_str(&hunk);
        }
        Some(patch)
    }

    fn patch_header(&self) -> String {
        let path = &self.path;
        let old_side = match self.status {
            FileStatus::Untracked => "new file mode 100644\n--- /dev/null".to_string(),
            FileStatus::Modified | FileStatus::Deleted => format!("--- a/{path}"),
        };
        format!("diff --git a/{path} b/{path}\n{old_side}\n+++ b/{path}\n")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diff::parse_diff;
    use similar_asserts::assert_eq;

    fn modified(lines: &[(&str, bool)]) -> ChangedFile {
        let hunk = Hunk {
            orig_start: 1,
            orig_count: 3,
            new_start: 1,
            new_count: 4,
            lines: lines
                .iter()
                .map(|(raw, staged)| Line::parse(raw).with_staged(*staged))
                .collect(),
        };
        ChangedFile::new("file1.go", FileStatus::Modified, vec![hunk])
    }

    #[test]
    fn untracked_synthesizes_one_addition_hunk() {
        let file = ChangedFile::untracked("new.txt", "line1\nline2\nline3\n");
        assert_eq!(file.status, FileStatus::Untracked);
        assert_eq!(file.hunks.len(), 1);

        let hunk = &file.hunks[0];
        assert_eq!(
            (hunk.orig_start, hunk.orig_count, hunk.new_start, hunk.new_count),
            (0, 0, 1, 3)
        );
        let contents: Vec<&str> = hunk.lines.iter().map(|l| l.content.as_str()).collect();
        assert_eq!(contents, vec!["+line1", "+line2", "+line3"]);
        assert!(hunk.lines.iter().all(|l| l.is_stageable() && !l.is_staged()));
    }

    #[test]
    fn untracked_without_final_newline() {
        let file = ChangedFile::untracked("new.txt", "a\nb");
        assert_eq!(file.hunks[0].new_count, 2);
    }

    #[test]
    fn untracked_keeps_inner_blank_lines() {
        let file = ChangedFile::untracked("new.txt", "a\n\nb\n");
        let contents: Vec<&str> = file.hunks[0]
            .lines
            .iter()
            .map(|l| l.content.as_str())
            .collect();
        assert_eq!(contents, vec!["+a", "+", "+b"]);
    }

    #[test]
    fn untracked_empty_has_no_hunks() {
        assert!(ChangedFile::untracked("empty.txt", "").hunks.is_empty());
    }

    #[test]
    fn staged_counts_span_hunks() {
        let mut file = ChangedFile::untracked("n.txt", "a\nb\nc\n");
        file.hunks.push(file.hunks[0].clone());
        file.hunks[0].lines[0].set_staged(true);
        file.hunks[1].lines[2].set_staged(true);
        assert_eq!(file.staged_counts(), (2, 6));
    }

    #[test]
    fn patch_for_modified_file() {
        let file = modified(&[
            (" context", false),
            ("+added1", true),
            ("-removed1", false),
            (" context2", false),
        ]);
        insta::assert_snapshot!(file.to_patch().unwrap(), @r"
diff --git a/file1.go b/file1.go
--- a/file1.go
+++ b/file1.go
@@ -1,3 +1,4 @@
 context
+added1
 removed1
 context2
");
    }

    #[test]
    fn patch_for_untracked_file() {
        let mut file = ChangedFile::untracked("file2.txt", "line1\nline2\nline3\n");
        file.hunks[0].lines[0].set_staged(true);
        file.hunks[0].lines[1].set_staged(true);

        insta::assert_snapshot!(file.to_patch().unwrap(), @r"
diff --git a/file2.txt b/file2.txt
new file mode 100644
--- /dev/null
+++ b/file2.txt
@@ -0,0 +1,2 @@
+line1
+line2
");
    }

    #[test]
    fn patch_for_deleted_file_uses_old_path() {
        let hunks = parse_diff("@@ -1,2 +0,0 @@\n-a\n-b\n");
        let mut file = ChangedFile::new("gone.txt", FileStatus::Deleted, hunks);
        file.hunks[0].lines[0].set_staged(true);
        assert_eq!(
            file.to_patch().unwrap(),
            "diff --git a/gone.txt b/gone.txt\n--- a/gone.txt\n+++ b/gone.txt\n@@ -1,2 +0,1 @@\n-a\n b\n"
        );
    }

    #[test]
    fn patch_skips_hunks_without_staged_lines() {
        let hunks = parse_diff("@@ -1,2 +1,2 @@\n a\n+b\n@@ -10,2 +10,2 @@\n c\n+d\n");
        let mut file = ChangedFile::new("f", FileStatus::Modified, hunks);
        file.hunks[1].lines[1].set_staged(true);
        assert_eq!(
            file.to_patch().unwrap(),
            "diff --git a/f b/f\n--- a/f\n+++ b/f\n@@ -10,1 +10,2 @@\n c\n+d\n"
        );
    }

    #[test]
    fn nothing_staged_is_no_patch() {
        let file = modified(&[(" context", false), ("+added", false), ("-removed", false)]);
        assert_eq!(file.to_patch(), None);
    }

    #[test]
    fn status_symbols() {
        assert_eq!(FileStatus::Modified.symbol(), 'M');
        assert_eq!(FileStatus::Deleted.symbol(), 'D');
        assert_eq!(FileStatus::Untracked.symbol(), '?');
    }
}
