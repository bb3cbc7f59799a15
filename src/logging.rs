//! File logging for gitstage.
//!
//! The terminal belongs to the staging UI, so logs only ever go to a file.
//!
//! ## Environment Variables
//!
//! 1. **`GITSTAGE_LOG`** (highest priority) - filter directives for gitstage
//! 2. **`RUST_LOG`** - standard tracing filter
//! 3. **Default** - `warn`
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/gitstage/logs/gitstage-<pid>.log`
//! - macOS: `~/Library/Application Support/gitstage/logs/gitstage-12345.log`
//! - Linux: `~/.local/share/gitstage/logs/gitstage-12345.log`
//!
//! Override with `--log-file <path>` or `GITSTAGE_LOG_FILE`. A path with an
//! extension names the file; one without is taken as the directory.

use crate::GitStageError;
use std::env;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Returned from [`init`]; must be held alive so buffered lines are flushed.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

/// Install the file subscriber.
pub fn init(log_file: Option<PathBuf>) -> Result<LogGuard, GitStageError> {
    let (log_dir, filename) = resolve_log_path(log_file);

    std::fs::create_dir_all(&log_dir).map_err(|e| GitStageError::Logging {
        message: format!("{}: {e}", log_dir.display()),
    })?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_filter());

    Registry::default()
        .with(file_layer)
        .try_init()
        .map_err(|e| GitStageError::Logging {
            message: e.to_string(),
        })?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("gitstage-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir.to_path_buf(), name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gitstage")
        .join("logs");

    (dir, filename)
}

/// `GITSTAGE_LOG` > `RUST_LOG` > `warn`
fn create_filter() -> EnvFilter {
    EnvFilter::new(filter_directives(
        env::var("GITSTAGE_LOG").ok(),
        env::var("RUST_LOG").ok(),
    ))
}

fn filter_directives(gitstage_log: Option<String>, rust_log: Option<String>) -> String {
    if let Some(directives) = gitstage_log {
        return expand_gitstage_log(&directives);
    }
    rust_log.unwrap_or_else(|| "warn".to_string())
}

/// A bare level in `GITSTAGE_LOG` applies to gitstage only, keeping other
/// crates at `warn`; anything else is used as-is.
fn expand_gitstage_log(directives: &str) -> String {
    match directives.trim() {
        level @ ("trace" | "debug" | "info" | "warn" | "error") => {
            format!("warn,gitstage={level}")
        }
        other => other.to_string(),
    }
}
