//! File-based logging via the tracing crate.
//!
//! Writes daily-rotated log files under the XDG state directory and never
//! logs to the terminal, which the waveform TUI owns. Old log files are
//! pruned at startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Days of rotated log files kept around.
const LOG_RETENTION_DAYS: usize = 7;

/// Keeps the non-blocking appender's worker alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Sets up the rolling file logger.
///
/// The filter comes from `RUST_LOG`, defaulting to "info".
///
/// # Errors
/// - If the log directory cannot be created
/// - If logging was already initialized
pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = get_log_dir()?;

    if let Err(e) = prune_old_logs(&log_dir) {
        eprintln!("Warning: failed to prune old logs: {e}");
    }

    let file_appender = rolling::daily(&log_dir, "wavetap.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging to {}", log_dir.display());
    Ok(())
}

/// Log directory per the XDG Base Directory Specification:
/// `$XDG_STATE_HOME/wavetap`, falling back to `~/.local/state/wavetap`.
pub fn get_log_dir() -> anyhow::Result<PathBuf> {
    let log_dir = match std::env::var("XDG_STATE_HOME") {
        Ok(xdg_state) => PathBuf::from(xdg_state).join("wavetap"),
        Err(_) => dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
            .join(".local/state/wavetap"),
    };

    fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

/// Deletes rotated log files (`wavetap.log.YYYY-MM-DD`) beyond the retention
/// count, newest first.
fn prune_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let mut rotated: Vec<(PathBuf, std::time::SystemTime)> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_string_lossy().to_string();
            if !name.starts_with("wavetap.log.") {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    rotated.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in rotated.iter().skip(LOG_RETENTION_DAYS) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }

    Ok(())
}
