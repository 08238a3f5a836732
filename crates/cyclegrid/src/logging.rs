#![forbid(unsafe_code)]

//! Subscriber setup.
//!
//! The interactive UI owns stdout and stderr is hidden behind the alternate
//! screen, so interactive runs log to a file. `dump` logs to stderr.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::{AppError, Result};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "CYCLEGRID_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// File target at `path`, or the default log file.
    pub fn file_or_default(path: Option<PathBuf>) -> Self {
        Self::File(path.unwrap_or_else(default_log_file))
    }
}

/// `cyclegrid.log` in the system temp directory.
pub fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("cyclegrid.log")
}

fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy()
}

/// Install the global subscriber.
pub fn init(target: &LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true);
    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = open_log(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    installed.map_err(|err| AppError::logging(err.to_string()))
}

fn open_log(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}
