//! Tracing setup. Events go to `$XDG_STATE_HOME/datamirror/datamirror.log`,
//! or to stderr when that file cannot be opened.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "info,datamirror=debug,datamirror_core=debug";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

pub fn default_log_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("datamirror")?;
    Ok(dirs.get_state_home().join("datamirror.log"))
}

/// Opens `path` for appending, creating missing parent directories.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log dir {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Installs the global subscriber and returns the log file in use
/// (`None` means events go to stderr).
pub fn init() -> Option<PathBuf> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_ansi(false);
    let opened = default_log_path().and_then(|path| {
        let file = open_log_file(&path)?;
        Ok((path, file))
    });

    // try_init: a subscriber installed earlier (tests, embedding) stays in place.
    match opened {
        Ok((path, file)) => {
            let _ = builder.with_writer(Mutex::new(file)).try_init();
            tracing::info!("datamirror logging to {}", path.display());
            Some(path)
        }
        Err(err) => {
            let _ = builder.with_writer(io::stderr).try_init();
            tracing::warn!("log file unavailable, logging to stderr: {:#}", err);
            None
        }
    }
}
