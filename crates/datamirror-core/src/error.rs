//! Error taxonomy for the download-verify-extract pipeline.
//!
//! Every variant is fatal at the core level; callers report it and exit.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the core.
pub type MirrorResult<T> = Result<T, MirrorError>;

#[derive(Debug, Error)]
pub enum MirrorError {
    /// Supplied cache path exists but is not a directory.
    #[error("cache dir {} already exists and it is a file", path.display())]
    InvalidPath { path: PathBuf },

    /// URL could not be parsed or has no usable file name in its path.
    #[error("invalid source url {url}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    /// Descriptor fields failed validation.
    #[error("invalid descriptor for dataset {name}: {field} {reason}")]
    InvalidDescriptor {
        name: String,
        field: &'static str,
        reason: &'static str,
    },

    /// Transport-level failure or non-2xx HTTP status.
    #[error("failed to fetch {url}: {reason}")]
    Network { url: String, reason: String },

    /// Local read/write failure.
    #[error("{operation} failed for {}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Downloaded archive does not hash to the expected digest.
    #[error(
        "{} checksum mismatch: expected {expected}, got {actual}. \
         Please download {url} to {} manually.",
        path.display(),
        cache_dir.display()
    )]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
        url: String,
        cache_dir: PathBuf,
    },

    /// Archive could not be opened, parsed, or contains unsafe entries.
    #[error("corrupt archive {}: {reason}", path.display())]
    CorruptArchive { path: PathBuf, reason: String },

    /// Extraction completed without producing the expected directory.
    #[error("byproduct dir {} not found after extraction", path.display())]
    MissingByproduct { path: PathBuf },

    /// Checksum requested on a path that is not a regular file.
    #[error("{} not found", path.display())]
    NotFound { path: PathBuf },
}

impl MirrorError {
    pub(crate) fn io(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        MirrorError::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
