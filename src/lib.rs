//! Interactive line-level staging for git.
//!
//! A session loads every changed file as hunks of classified lines
//! ([`stage::load_files`]), lets the user pick individual additions and
//! removals ([`Selection`]), and writes exactly that choice to the index
//! ([`stage::plan_staging`], [`stage::execute_plan`]) by rebuilding partial
//! patches from the picked lines.

use error_set::error_set;

pub mod diff;
pub mod git;
pub mod logging;
pub mod reconcile;
pub mod selection;
pub mod stage;
pub mod ui;

pub use diff::{ChangedFile, FileStatus, Hunk, Line, LineKind, parse_diff};
pub use git::{Backend, GitCli, StatusEntry};
pub use selection::{DisplayLine, Selection};
pub use stage::{StageAction, execute_plan, load_files, plan_staging, stage_selection};

error_set! {
    /// Top-level error for gitstage operations
    GitStageError := {
        #[display("Failed to stage {path}: {message}")]
        StageFailed { path: String, message: String },
        #[display("Terminal error: {message}")]
        Terminal { message: String },
        #[display("Failed to set up logging: {message}")]
        Logging { message: String },
    } || GitError

    /// Errors from running git commands
    GitError := {
        #[display("Not a git repository: {path}")]
        NotARepository { path: String },
        #[display("Failed to run git {command}: {message}")]
        SpawnFailed { command: String, message: String },
        #[display("git {command} failed: {stderr}")]
        ExitError { command: String, stderr: String },
        #[display("Invalid UTF-8 in git {command} output: {message}")]
        InvalidUtf8 { command: String, message: String },
        #[display("Failed to get stdin handle for git {command}")]
        StdinFailed { command: String },
        #[display("Failed to write to git {command}: {message}")]
        WriteFailed { command: String, message: String },
        #[display("Failed to read {path}: {message}")]
        ReadFailed { path: String, message: String },
    }
}
