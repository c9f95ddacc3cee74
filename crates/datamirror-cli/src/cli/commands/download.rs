//! Download command: run the pipeline for one dataset and print the result.

use anyhow::{Context, Result};
use datamirror_core::config::FetchConfig;
use datamirror_core::progress::{LogProgress, ProgressObserver};
use datamirror_core::workdir::Lifetime;
use datamirror_core::{materialize, render_tree, CurlFetcher, DatasetDescriptor, MirrorError};
use std::path::Path;

use crate::cli::progress_bar::BarProgress;

pub fn run_download(
    descriptor: &DatasetDescriptor,
    download_dir: &Path,
    cache_dir: Option<&Path>,
    fetch: &FetchConfig,
    quiet: bool,
) -> Result<()> {
    println!("{}: {}", descriptor.name, descriptor.source_url);
    print!("{}", dirs_banner(download_dir, cache_dir));

    let progress: Box<dyn ProgressObserver> = if quiet {
        Box::new(LogProgress::new())
    } else {
        Box::new(BarProgress::new())
    };
    let mut fetcher = CurlFetcher::new(fetch.to_options()).with_progress(progress);

    let report = match materialize(descriptor, download_dir, cache_dir, &mut fetcher) {
        Ok(report) => report,
        Err(err @ MirrorError::ChecksumMismatch { .. }) if cache_dir.is_none() => {
            return Err(anyhow::Error::new(err).context(format!(
                "dataset {} failed verification; rerun with --cache_dir <DIR> to keep the archive",
                descriptor.name
            )));
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to materialize dataset {}", descriptor.name));
        }
    };

    if report.cache_lifetime == Lifetime::Ephemeral {
        println!("cache_dir: {} (temporary, removed)", report.cache_dir.display());
    }
    if report.cache_hit {
        println!("{} checksum matches, skipped download.", report.archive_path.display());
    }
    println!("Extracted:");
    print!("{}", render_tree(&report));
    Ok(())
}

/// Directories in use, printed before the pipeline starts.
fn dirs_banner(download_dir: &Path, cache_dir: Option<&Path>) -> String {
    let cache = match cache_dir {
        Some(dir) => dir.display().to_string(),
        None => "(temporary directory)".to_string(),
    };
    format!("download_dir: {}\ncache_dir: {}\n", download_dir.display(), cache)
}
