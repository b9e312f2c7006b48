//! File logging. The terminal belongs to the UI, so nothing is written to
//! stdout or stderr once the app starts.

use directories::BaseDirs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::{DockchatError, Result};

const LOG_DIR: &str = "dockchat";
const LOG_FILE: &str = "dockchat.log";

/// Default log location under the user's cache directory.
pub fn default_log_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.cache_dir().join(LOG_DIR).join(LOG_FILE))
}

/// `RUST_LOG` wins over the configured level.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Install the global subscriber. Keep the returned guard alive for the
/// whole run or buffered lines are lost on exit.
pub fn init(level: &str, file: Option<&Path>) -> Result<WorkerGuard> {
    let path = file
        .map(Path::to_path_buf)
        .or_else(default_log_path)
        .ok_or_else(|| DockchatError::Logging("Could not determine log directory".to_string()))?;

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .map_err(|e| DockchatError::Logging(format!("Failed to create {}: {}", dir.display(), e)))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| DockchatError::Logging(format!("Not a file path: {}", path.display())))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| DockchatError::Logging(e.to_string()))?;

    tracing::info!("dockchat {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_level_falls_back() {
        // Must not panic on garbage
        let filter = build_filter("not a [valid filter");
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn test_default_log_path_file_name() {
        if let Some(path) = default_log_path() {
            assert!(path.ends_with(Path::new(LOG_DIR).join(LOG_FILE)));
        }
    }
}
