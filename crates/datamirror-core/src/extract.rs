//! Zip extraction into the download root and top-level listing.

use crate::error::{MirrorError, MirrorResult};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Unpacks `archive` under `destination`, preserving its internal layout.
pub fn extract_zip(archive: &Path, destination: &Path) -> MirrorResult<()> {
    let corrupt = |reason: String| MirrorError::CorruptArchive {
        path: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive).map_err(|e| MirrorError::io("open archive", archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| corrupt(e.to_string()))?;
    fs::create_dir_all(destination)
        .map_err(|e| MirrorError::io("create download dir", destination, e))?;
    tracing::debug!(
        "extracting {} entries from {} into {}",
        zip.len(),
        archive.display(),
        destination.display()
    );

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| corrupt(e.to_string()))?;
        let relative = sanitize_entry_path(entry.name()).map_err(corrupt)?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = destination.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| MirrorError::io("create extracted dir", &target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| MirrorError::io("create extracted dir", parent, e))?;
        }
        // A previous run may have left a read-only copy behind.
        match fs::remove_file(&target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(MirrorError::io("replace extracted file", &target, e)),
        }
        let mut output = File::create(&target)
            .map_err(|e| MirrorError::io("create extracted file", &target, e))?;
        copy_entry(&mut entry, &mut output).map_err(|e| match e {
            CopyError::Read(e) => corrupt(format!("{}: {}", entry.name(), e)),
            CopyError::Write(e) => MirrorError::io("write extracted file", &target, e),
        })?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            fs::set_permissions(&target, fs::Permissions::from_mode(mode))
                .map_err(|e| MirrorError::io("set extracted permissions", &target, e))?;
        }
    }

    Ok(())
}

enum CopyError {
    /// Decompression or CRC failure in the archive entry.
    Read(io::Error),
    Write(io::Error),
}

fn copy_entry(entry: &mut impl Read, output: &mut impl Write) -> Result<u64, CopyError> {
    let mut buf = vec![0u8; 64 * 1024];
    let mut copied = 0u64;
    loop {
        let n = match entry.read(&mut buf) {
            Ok(0) => return Ok(copied),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        output.write_all(&buf[..n]).map_err(CopyError::Write)?;
        copied += n as u64;
    }
}

/// Rejects absolute entries and parent traversal so nothing escapes the destination.
fn sanitize_entry_path(name: &str) -> Result<PathBuf, String> {
    let path = Path::new(name);
    let mut sanitized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => sanitized.push(segment),
            Component::CurDir => {}
            _ => return Err(format!("unsafe entry path {:?}", name)),
        }
    }
    Ok(sanitized)
}

/// Names of the immediate children of `dir`, sorted.
pub fn list_top_level(dir: &Path) -> MirrorResult<Vec<String>> {
    let read_dir = fs::read_dir(dir).map_err(|e| MirrorError::io("list dir", dir, e))?;
    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| MirrorError::io("list dir", dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
