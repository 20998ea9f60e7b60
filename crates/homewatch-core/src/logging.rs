//! Logging infrastructure for Homewatch.
//!
//! Two `tracing` layers share one filter:
//!
//! - JSON lines in `~/.homewatch/logs/homewatch.<date>.log`, rotated daily,
//!   keeping the last [`MAX_LOG_FILES`] files
//! - compact human-readable lines on stderr (stdout is reserved for the
//!   suggestion feed)
//!
//! `RUST_LOG` replaces the default filter entirely.
//!
//! ## Example
//!
//! ```no_run
//! use homewatch_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!("homewatch started");
//! tracing::debug!(alert_id = "5f0c", "alert merged");
//! ```

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{HomewatchError, Result};

/// Prefix of the rolling JSON log files.
pub const LOG_FILE_PREFIX: &str = "homewatch";

/// Daily log files kept before the oldest is deleted.
pub const MAX_LOG_FILES: usize = 14;

/// Target used for alert lifecycle events.
pub const ALERT_TARGET: &str = "homewatch::alert";

/// Keeps the background log writer alive; drop it last.
pub struct LogGuard {
    log_dir: PathBuf,
    _file_guard: WorkerGuard,
}

impl LogGuard {
    /// Directory the JSON log is written to.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Initialize the Homewatch logging system.
///
/// `log_dir` defaults to `~/.homewatch/logs/`. `verbose` lowers the default
/// level from INFO to DEBUG and adds source locations to stderr output.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };
    ensure_log_dir(&log_dir)?;

    let appender = rolling_appender(&log_dir)?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .json()
        .with_current_span(false)
        .flatten_event(true);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| HomewatchError::internal(format!("logging already initialized: {e}")))?;

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        log_dir,
        _file_guard: file_guard,
    })
}

/// Default filter directives when `RUST_LOG` is unset.
///
/// Alert lifecycle events stay at INFO even in quiet runs.
pub fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("homewatch={level},{ALERT_TARGET}=info")
}

fn rolling_appender(log_dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .map_err(|e| HomewatchError::internal(format!("cannot open log file in {}: {e}", log_dir.display())))
}

/// Console-only logging for tests. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Create the log directory if it does not exist.
pub fn ensure_log_dir(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir).map_err(|e| HomewatchError::DirectoryCreation {
        path: log_dir.to_path_buf(),
        source: e,
    })
}

/// `~/.homewatch/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .ok_or_else(|| HomewatchError::internal("HOME environment variable not set"))?;
    Ok(PathBuf::from(home).join(".homewatch").join("logs"))
}

/// Log an alert lifecycle event under the `homewatch::alert` target.
///
/// ```ignore
/// log_alert_event!(alert.id(), "created");
/// log_alert_event!(alert.id(), "merged", count = alert.count());
/// ```
#[macro_export]
macro_rules! log_alert_event {
    ($alert_id:expr, $event:expr) => {
        tracing::info!(
            target: "homewatch::alert",
            alert_id = %$alert_id,
            event = $event,
            "alert event"
        )
    };
    ($alert_id:expr, $event:expr, $($field:tt)*) => {
        tracing::info!(
            target: "homewatch::alert",
            alert_id = %$alert_id,
            event = $event,
            $($field)*,
            "alert event"
        )
    };
}
