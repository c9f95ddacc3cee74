//! CLI for the datamirror dataset downloader.

mod commands;
mod progress_bar;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use datamirror_core::config::{self, MirrorConfig};
use datamirror_core::{DatasetDescriptor, Registry};
use std::path::PathBuf;

use commands::{run_download, run_list};

/// Top-level CLI: materialize one named dataset.
#[derive(Debug, Parser)]
#[command(name = "datamirror")]
#[command(about = "Datamirror: downloader for common NeRF datasets", long_about = None)]
pub struct Cli {
    /// Dataset name (see --list for the registered names).
    #[arg(required_unless_present = "list")]
    pub dataset_name: Option<String>,

    /// Download directory; the archive is extracted here. Defaults to the config value ("data").
    #[arg(long = "download_dir", visible_alias = "download-dir", value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Cache directory that keeps the raw archive between runs. Without it a temporary dir is used.
    #[arg(long = "cache_dir", visible_alias = "cache-dir", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// List registered datasets and exit.
    #[arg(long, conflicts_with = "dataset_name")]
    pub list: bool,

    /// Do not draw a download progress bar (progress still goes to the log).
    #[arg(long, short)]
    pub quiet: bool,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = cli.config(config::load_or_init())?;
        tracing::debug!("loaded config: {:?}", cfg);
        let registry = Registry::with_extra(&cfg.datasets).context("invalid dataset in config")?;

        if cli.list {
            run_list(&registry);
            return Ok(());
        }

        let name = cli.dataset_name.as_deref().unwrap_or_default();
        let descriptor = resolve_dataset(&registry, name)?;
        let (download_dir, cache_dir) = cli.resolve_dirs(&cfg);
        run_download(
            descriptor,
            &download_dir,
            cache_dir.as_deref(),
            &cfg.fetch,
            cli.quiet,
        )
    }

    /// A broken config must not mask a mistyped dataset name: when loading
    /// fails, the name is checked against the built-ins before the config error
    /// is returned.
    fn config(&self, loaded: Result<MirrorConfig>) -> Result<MirrorConfig> {
        let err = match loaded {
            Ok(cfg) => return Ok(cfg),
            Err(err) => err,
        };
        if let (Some(name), false) = (self.dataset_name.as_deref(), self.list) {
            resolve_dataset(&Registry::builtin(), name)?;
        }
        Err(err.context("failed to load config"))
    }

    /// Flags win over config; config supplies the defaults.
    fn resolve_dirs(&self, cfg: &MirrorConfig) -> (PathBuf, Option<PathBuf>) {
        let download_dir = self
            .download_dir
            .clone()
            .unwrap_or_else(|| cfg.download_dir.clone());
        let cache_dir = self.cache_dir.clone().or_else(|| cfg.cache_dir.clone());
        (download_dir, cache_dir)
    }
}

/// Looks up `name`, reporting unknown names as a usage error listing the choices.
fn resolve_dataset<'r>(
    registry: &'r Registry,
    name: &str,
) -> Result<&'r DatasetDescriptor, clap::Error> {
    registry.get(name).ok_or_else(|| {
        Cli::command().error(
            ErrorKind::InvalidValue,
            format!(
                "invalid value '{}' for '<DATASET_NAME>' [possible values: {}]",
                name,
                registry.names().join(", ")
            ),
        )
    })
}
