//! Loading changes from a repository and writing a selection back.

use crate::{GitError, GitStageError};
use crate::diff::{ChangedFile, FileStatus, Hunk, parse_diff};
use crate::git::Backend;
use crate::reconcile::mark_pre_staged;
use std::fmt;
use tracing::{debug, info, warn};

/// Collect every changed file of the repository with its hunks.
///
/// Tracked files are diffed against `HEAD` (or, in a repository without
/// commits, read from the index) and lines already in the index are marked
/// staged. Untracked files become a single addition hunk. Files without any
/// hunk are left out.
///
/// Only a failing `status` is an error; a file whose diff or content cannot
/// be read is logged and skipped.
pub fn load_files<B: Backend + ?Sized>(backend: &B) -> Result<Vec<ChangedFile>, GitError> {
    let has_head = backend.has_head();
    let mut files = Vec::new();

    for entry in backend.status()? {
        let file = match entry.status {
            FileStatus::Untracked => match backend.read_worktree_file(&entry.path) {
                Ok(contents) => ChangedFile::untracked(entry.path, &contents),
                Err(err) => {
                    warn!(path = %entry.path, %err, "skipping unreadable untracked file");
                    continue;
                }
            },
            status => ChangedFile::new(
                entry.path.clone(),
                status,
                tracked_hunks(backend, &entry.path, has_head),
            ),
        };

        if file.hunks.is_empty() {
            debug!(path = %file.path, "no hunks, skipping");
            continue;
        }
        files.push(file);
    }

    info!(count = files.len(), "loaded changed files");
    Ok(files)
}

fn tracked_hunks<B: Backend + ?Sized>(backend: &B, path: &str, has_head: bool) -> Vec<Hunk> {
    let mut hunks = if has_head {
        parse_diff(&or_empty(backend.diff("HEAD", path), path))
    } else {
        Vec::new()
    };
    let cached = parse_diff(&or_empty(backend.cached_diff(path), path));

    if hunks.is_empty() {
        hunks = cached.clone();
    }
    if !cached.is_empty() {
        mark_pre_staged(&mut hunks, &cached);
    }
    hunks
}

fn or_empty(diff: Result<String, GitError>, path: &str) -> String {
    diff.unwrap_or_else(|err| {
        warn!(path, %err, "could not diff file, treating as unchanged");
        String::new()
    })
}

/// One index operation needed to persist a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageAction {
    /// Drop everything staged for the path
    Reset { path: String },
    /// Stage the whole path
    Add { path: String },
    /// Record an untracked path without content
    AddIntent { path: String },
    /// Apply a partial patch to the index
    ApplyPatch { path: String, patch: String },
}

impl StageAction {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            StageAction::Reset { path }
            | StageAction::Add { path }
            | StageAction::AddIntent { path }
            | StageAction::ApplyPatch { path, .. } => path,
        }
    }
}

impl fmt::Display for StageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageAction::Reset { path } => write!(f, "reset {path}"),
            StageAction::Add { path } => write!(f, "add {path}"),
            StageAction::AddIntent { path } => write!(f, "add --intent-to-add {path}"),
            StageAction::ApplyPatch { path, patch } => {
                write!(f, "apply patch to {path}\n{}", patch.trim_end_matches('\n'))
            }
        }
    }
}

/// Turn the final selection into index operations.
///
/// Files the user never touched are skipped so that whatever was staged
/// before the session stays as it was. A touched file is rebuilt from a
/// clean index entry: tracked files are reset first, untracked files are
/// added with intent-to-add before any partial patch.
#[must_use]
pub fn plan_staging(files: &[ChangedFile]) -> Vec<StageAction> {
    let mut plan = Vec::new();

    for file in files.iter().filter(|f| f.touched) {
        let path = file.path.clone();
        let (staged, total) = file.staged_counts();

        if file.status == FileStatus::Untracked {
            if staged == 0 {
                continue;
            }
            plan.push(StageAction::AddIntent { path: path.clone() });
        } else {
            plan.push(StageAction::Reset { path: path.clone() });
            if staged == 0 {
                continue;
            }
        }

        if staged == total {
            plan.push(StageAction::Add { path });
        } else if let Some(patch) = file.to_patch() {
            plan.push(StageAction::ApplyPatch { path, patch });
        }
    }

    plan
}

/// Run `plan` against the repository, stopping at the first failure.
///
/// Actions already performed are not rolled back.
pub fn execute_plan<B: Backend + ?Sized>(
    backend: &B,
    plan: &[StageAction],
) -> Result<(), GitStageError> {
    for action in plan {
        debug!(%action, "executing");
        let result = match action {
            StageAction::Reset { path } => backend.reset_path(path),
            StageAction::Add { path } => backend.add_path(path),
            StageAction::AddIntent { path } => backend.add_intent_path(path),
            StageAction::ApplyPatch { patch, .. } => backend.apply_cached_patch(patch),
        };

        result.map_err(|err| GitStageError::StageFailed {
            path: action.path().to_string(),
            message: err.to_string(),
        })?;
    }

    info!(actions = plan.len(), "selection written to index");
    Ok(())
}

/// Write the selection of `files` to the index
pub fn stage_selection<B: Backend + ?Sized>(
    backend: &B,
    files: &[ChangedFile],
) -> Result<(), GitStageError> {
    execute_plan(backend, &plan_staging(files))
}
