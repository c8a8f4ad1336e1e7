//! File logging. The terminal belongs to the UI, so nothing is written to
//! stdout or stderr while it runs.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use directories::ProjectDirs;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "pomotune=info";

/// Installs a subscriber writing to `<data dir>/logs/<timestamp>.log`,
/// filtered by `RUST_LOG`. Returns the log file path, or `None` when no data
/// directory could be determined and logging stays off.
pub fn init_tracing() -> Result<Option<PathBuf>> {
    let Some(proj_dirs) = ProjectDirs::from("com", "pomotune", "pomotune") else {
        return Ok(None);
    };

    let log_dir = proj_dirs.data_dir().join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;

    let path = log_dir.join(format!("{}.log", Local::now().format("%Y%m%d_%H%M%S")));
    let file =
        File::create(&path).with_context(|| format!("Failed to create log file {:?}", path))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    tracing::debug!(path = %path.display(), "Tracing initialized");
    Ok(Some(path))
}
