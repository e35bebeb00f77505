//! Tracing setup for the shelfmark CLI.
//!
//! Each run appends to `<home>/logs/<app>.log`. When that file has grown past
//! [`MAX_LOG_BYTES`] it is moved to `<app>.log.old` before the run starts, so
//! at most two generations exist on disk.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable overriding the shelfmark home directory.
pub const HOME_ENV: &str = "SHELFMARK_HOME";

/// Size at which the log is moved aside on the next start.
pub const MAX_LOG_BYTES: u64 = 4 * 1024 * 1024;

const DEFAULT_FILTER: &str = "shelfmark=info";

pub struct LogConfig<'a> {
    /// Stem of the log file name.
    pub app_name: &'a str,
    /// Send the file filter to stderr too, instead of warnings only.
    pub verbose: bool,
}

/// Install the global subscriber: a log file plus stderr.
///
/// `RUST_LOG` overrides the file filter.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let dir = logs_dir();
    let file = open_log_file(&dir, config.app_name, MAX_LOG_BYTES)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stderr_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .without_time()
                .with_filter(stderr_filter),
        )
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(())
}

/// `$SHELFMARK_HOME`, else `~/.shelfmark`, else `./.shelfmark`.
pub fn shelfmark_home() -> PathBuf {
    match std::env::var_os(HOME_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".shelfmark"),
    }
}

pub fn logs_dir() -> PathBuf {
    shelfmark_home().join("logs")
}

/// Open `<dir>/<app>.log` for appending, first moving an oversized log to
/// `<app>.log.old`.
fn open_log_file(dir: &Path, app_name: &str, max_bytes: u64) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.log", app_name));

    let size = match fs::metadata(&path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => 0,
        Err(err) => return Err(err),
    };
    if size > max_bytes {
        let old = dir.join(format!("{}.log.old", app_name));
        // rename does not replace an existing target on every platform
        if old.exists() {
            fs::remove_file(&old)?;
        }
        fs::rename(&path, &old)?;
    }

    OpenOptions::new().create(true).append(true).open(&path)
}
