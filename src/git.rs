//! Repository access through the `git` command line.
//!
//! [`Backend`] is the seam between the staging session and the repository;
//! [`GitCli`] implements it by running `git` against the repository's
//! top-level directory, so the paths reported by `git status` can be passed
//! straight back as pathspecs.

use crate::GitError;
use crate::diff::FileStatus;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::{debug, warn};

/// A changed path as reported by the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: String,
    pub status: FileStatus,
}

/// Operations the staging session needs from a repository
pub trait Backend {
    /// Changed paths, classified
    fn status(&self) -> Result<Vec<StatusEntry>, GitError>;

    /// Whether the repository has at least one commit
    fn has_head(&self) -> bool;

    /// Unified diff of `path` between `rev` and the working tree
    fn diff(&self, rev: &str, path: &str) -> Result<String, GitError>;

    /// Unified diff of `path` between `HEAD` and the index
    fn cached_diff(&self, path: &str) -> Result<String, GitError>;

    /// Apply a unified diff to the index only
    fn apply_cached_patch(&self, patch: &str) -> Result<(), GitError>;

    /// Drop every staged change of `path`
    fn reset_path(&self, path: &str) -> Result<(), GitError>;

    /// Stage `path` completely
    fn add_path(&self, path: &str) -> Result<(), GitError>;

    /// Record an untracked `path` in the index with no content
    fn add_intent_path(&self, path: &str) -> Result<(), GitError>;

    /// Current working tree content of `path`
    fn read_worktree_file(&self, path: &str) -> Result<String, GitError>;
}

/// [`Backend`] implementation that shells out to `git`
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Open the repository containing `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, GitError> {
        let dir = dir.as_ref();
        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .map_err(|e| GitError::SpawnFailed {
                command: "rev-parse".to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GitError::NotARepository {
                path: dir.display().to_string(),
            });
        }

        let root = String::from_utf8(output.stdout).map_err(|e| GitError::InvalidUtf8 {
            command: "rev-parse".to_string(),
            message: e.to_string(),
        })?;
        let root = PathBuf::from(root.trim_end_matches(['\n', '\r']));
        debug!(root = %root.display(), "opened repository");

        Ok(GitCli { root })
    }

    /// Top-level directory of the working tree
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new("git");
        // Paths are always exact file names, never globs
        command
            .arg("-C")
            .arg(&self.root)
            .arg("--literal-pathspecs")
            .args(args);
        command
    }

    /// Run git and return its stdout, failing on a non-zero exit
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        debug!(?args, "running git");
        let output = self
            .command(args)
            .output()
            .map_err(|e| GitError::SpawnFailed {
                command: subcommand(args),
                message: e.to_string(),
            })?;
        let output = check_exit(args, output)?;

        String::from_utf8(output.stdout).map_err(|e| GitError::InvalidUtf8 {
            command: subcommand(args),
            message: e.to_string(),
        })
    }

    /// Run git with `input` on stdin
    fn run_with_stdin(&self, args: &[&str], input: &str) -> Result<(), GitError> {
        debug!(?args, bytes = input.len(), "running git with stdin");
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GitError::SpawnFailed {
                command: subcommand(args),
                message: e.to_string(),
            })?;

        child
            .stdin
            .take()
            .ok_or_else(|| GitError::StdinFailed {
                command: subcommand(args),
            })?
            .write_all(input.as_bytes())
            .map_err(|e| GitError::WriteFailed {
                command: subcommand(args),
                message: e.to_string(),
            })?;

        let output = child
            .wait_with_output()
            .map_err(|e| GitError::SpawnFailed {
                command: subcommand(args),
                message: e.to_string(),
            })?;
        check_exit(args, output).map(|_| ())
    }
}

impl Backend for GitCli {
    fn status(&self) -> Result<Vec<StatusEntry>, GitError> {
        let output = self.run(&["status", "--porcelain=v1", "-z", "--untracked-files=all"])?;
        Ok(parse_porcelain(&output))
    }

    fn has_head(&self) -> bool {
        self.command(&["rev-parse", "--verify", "-q", "HEAD"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    fn diff(&self, rev: &str, path: &str) -> Result<String, GitError> {
        self.run(&["diff", "--no-ext-diff", "--no-color", rev, "--", path])
    }

    fn cached_diff(&self, path: &str) -> Result<String, GitError> {
        self.run(&["diff", "--no-ext-diff", "--no-color", "--cached", "--", path])
    }

    fn apply_cached_patch(&self, patch: &str) -> Result<(), GitError> {
        match self.run_with_stdin(&["apply", "--cached", "--allow-empty", "-"], patch) {
            Ok(()) => Ok(()),
            Err(err) => {
                // git before 2.35 has no --allow-empty
                warn!(%err, "git apply failed, retrying without --allow-empty");
                self.run_with_stdin(&["apply", "--cached", "-"], patch)
            }
        }
    }

    fn reset_path(&self, path: &str) -> Result<(), GitError> {
        if self.has_head() {
            return self.run(&["reset", "-q", "HEAD", "--", path]).map(|_| ());
        }
        // Without a commit there is nothing to reset to; the path may not
        // even be in the index.
        if let Err(err) = self.run(&["rm", "--cached", "-q", "--", path]) {
            debug!(%err, path, "ignoring failed unstage in repository without HEAD");
        }
        Ok(())
    }

    fn add_path(&self, path: &str) -> Result<(), GitError> {
        self.run(&["add", "--", path]).map(|_| ())
    }

    fn add_intent_path(&self, path: &str) -> Result<(), GitError> {
        self.run(&["add", "-N", "--", path]).map(|_| ())
    }

    fn read_worktree_file(&self, path: &str) -> Result<String, GitError> {
        let bytes = std::fs::read(self.root.join(path)).map_err(|e| GitError::ReadFailed {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn subcommand(args: &[&str]) -> String {
    args.first().copied().unwrap_or_default().to_string()
}

fn check_exit(args: &[&str], output: Output) -> Result<Output, GitError> {
    if output.status.success() {
        return Ok(output);
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
    warn!(?args, %stderr, "git exited with {}", output.status);
    Err(GitError::ExitError {
        command: subcommand(args),
        stderr,
    })
}

/// Parse `git status --porcelain=v1 -z` output.
///
/// Entries are NUL-terminated `XY path` records with paths unquoted.
/// Untracked (`??`), deleted (`D` on either side) and modified (`M` on
/// either side, or added to the index) paths are kept. Renames and copies
/// carry their source path as an extra record; both are skipped, as are
/// conflicts and repeated paths.
#[must_use]
pub fn parse_porcelain(output: &str) -> Vec<StatusEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    let mut records = output.split('\0');

    while let Some(record) = records.next() {
        let bytes = record.as_bytes();
        if bytes.len() < 3 {
            continue;
        }
        let (x, y) = (bytes[0], bytes[1]);
        if matches!(x, b'R' | b'C') || matches!(y, b'R' | b'C') {
            records.next();
            continue;
        }
        let Some(path) = record.get(3..) else {
            continue;
        };
        if !seen.insert(path) {
            continue;
        }

        let status = match (x, y) {
            (b'?', b'?') => FileStatus::Untracked,
            (b'D', _) | (_, b'D') => FileStatus::Deleted,
            (b'M', _) | (_, b'M') | (b'A', _) => FileStatus::Modified,
            _ => continue,
        };

        entries.push(StatusEntry {
            path: path.to_string(),
            status,
        });
    }

    entries
}
