//! The download-verify-extract pipeline.
//!
//! `materialize` takes a descriptor through
//! `CacheCheck → {CacheHit | Download → VerifyAfterDownload} → Extract →
//! ValidateByproduct → Cleanup → Done`. Any error ends the run; the work dir
//! guard is released on every path, removing ephemeral caches.

use crate::checksum;
use crate::error::{MirrorError, MirrorResult};
use crate::extract;
use crate::fetch::Fetcher;
use crate::registry::DatasetDescriptor;
use crate::url_model::archive_file_name;
use crate::workdir::{Lifetime, WorkDir};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

/// Pipeline stage, logged on entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CacheCheck,
    CacheHit,
    Download,
    VerifyAfterDownload,
    Extract,
    ValidateByproduct,
    Cleanup,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::CacheCheck => "cache_check",
            Stage::CacheHit => "cache_hit",
            Stage::Download => "download",
            Stage::VerifyAfterDownload => "verify_after_download",
            Stage::Extract => "extract",
            Stage::ValidateByproduct => "validate_byproduct",
            Stage::Cleanup => "cleanup",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub dataset: String,
    pub download_dir: PathBuf,
    /// Where the archive was staged. Already removed if `cache_lifetime` is ephemeral.
    pub cache_dir: PathBuf,
    pub cache_lifetime: Lifetime,
    pub archive_path: PathBuf,
    /// True when a cached archive verified and no fetch happened.
    pub cache_hit: bool,
    pub byproduct_dir: PathBuf,
    /// Top-level entries of `byproduct_dir`, sorted.
    pub entries: Vec<String>,
}

/// Fetches (or reuses), verifies and extracts `descriptor` into `download_dir`.
///
/// `cache_dir` keeps the archive across runs; `None` stages it in a temporary
/// directory that is removed before this returns, on success and failure.
pub fn materialize(
    descriptor: &DatasetDescriptor,
    download_dir: &Path,
    cache_dir: Option<&Path>,
    fetcher: &mut dyn Fetcher,
) -> MirrorResult<Materialized> {
    descriptor.validate()?;
    let work = WorkDir::acquire(cache_dir)?;
    match run(descriptor, download_dir, &work, fetcher) {
        Ok(report) => {
            work.close()?;
            Ok(report)
        }
        Err(e) => {
            tracing::error!("materializing {} failed: {}", descriptor.name, e);
            drop(work);
            Err(e)
        }
    }
}

fn enter(dataset: &str, stage: Stage) {
    tracing::debug!(dataset, %stage, "entering stage");
}

fn run(
    descriptor: &DatasetDescriptor,
    download_dir: &Path,
    work: &WorkDir,
    fetcher: &mut dyn Fetcher,
) -> MirrorResult<Materialized> {
    let name: &str = &descriptor.name;
    let url: &str = &descriptor.source_url;
    let expected = descriptor.expected_checksum.trim();
    let download_dir = std::path::absolute(download_dir)
        .map_err(|e| MirrorError::io("resolve download dir", download_dir, e))?;
    let cache_dir = work.path();
    tracing::info!("download_dir: {}", download_dir.display());
    tracing::info!("cache_dir: {} ({:?})", cache_dir.display(), work.lifetime());

    enter(name, Stage::CacheCheck);
    let archive_path = cache_dir.join(archive_file_name(url)?);
    let mut cache_hit = false;
    if archive_path.is_file() {
        tracing::info!("{} exists, checking checksum", archive_path.display());
        if checksum::verify(&archive_path, expected)? {
            tracing::info!("{} checksum matches, skipping download", archive_path.display());
            cache_hit = true;
        } else {
            tracing::info!("{} checksum mismatches, will download again", archive_path.display());
        }
    }

    if cache_hit {
        enter(name, Stage::CacheHit);
    } else {
        enter(name, Stage::Download);
        fetcher.fetch(url, &archive_path)?;

        enter(name, Stage::VerifyAfterDownload);
        let actual = checksum::sha256_path(&archive_path)?;
        if !checksum::digests_match(&actual, expected) {
            return Err(MirrorError::ChecksumMismatch {
                path: archive_path,
                expected: expected.to_string(),
                actual,
                url: url.to_string(),
                cache_dir: cache_dir.to_path_buf(),
            });
        }
        tracing::info!("{} downloaded successfully", archive_path.display());
    }

    enter(name, Stage::Extract);
    extract::extract_zip(&archive_path, &download_dir)?;

    enter(name, Stage::ValidateByproduct);
    let byproduct_dir = download_dir.join(&*descriptor.byproduct_relative_path);
    if !byproduct_dir.is_dir() {
        return Err(MirrorError::MissingByproduct {
            path: byproduct_dir,
        });
    }

    enter(name, Stage::Cleanup);
    if let Some(cleanup) = &descriptor.cleanup_relative_path {
        remove_if_present(&download_dir.join(&**cleanup))?;
    }

    let entries = extract::list_top_level(&byproduct_dir)?;
    enter(name, Stage::Done);
    tracing::info!(
        "materialized {} at {} ({} entries)",
        name,
        byproduct_dir.display(),
        entries.len()
    );

    Ok(Materialized {
        dataset: name.to_string(),
        download_dir,
        cache_dir: cache_dir.to_path_buf(),
        cache_lifetime: work.lifetime(),
        archive_path,
        cache_hit,
        byproduct_dir,
        entries,
    })
}

fn remove_if_present(path: &Path) -> MirrorResult<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(MirrorError::io("stat cleanup path", path, e)),
    };
    tracing::info!("removing {}", path.display());
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| MirrorError::io("remove cleanup dir", path, e))
    } else {
        fs::remove_file(path).map_err(|e| MirrorError::io("remove cleanup file", path, e))
    }
}

/// Tree listing of the byproduct dir: the dir itself, then one branch per entry.
pub fn render_tree(report: &Materialized) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.byproduct_dir.display());
    let last = report.entries.len().saturating_sub(1);
    for (i, entry) in report.entries.iter().enumerate() {
        let branch = if i == last { "└──" } else { "├──" };
        let _ = writeln!(out, "{} {}", branch, entry);
    }
    out
}
