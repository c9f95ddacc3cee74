//! SHA-256 verification of cached and freshly downloaded archives.

use crate::error::{MirrorError, MirrorResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large archives.
pub fn sha256_path(path: &Path) -> MirrorResult<String> {
    if !path.is_file() {
        return Err(MirrorError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let mut f = File::open(path).map_err(|e| MirrorError::io("open for checksum", path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .map_err(|e| MirrorError::io("read for checksum", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// True when the file's digest equals `expected` (hex, case-insensitive).
pub fn verify(path: &Path, expected: &str) -> MirrorResult<bool> {
    let actual = sha256_path(path)?;
    Ok(digests_match(&actual, expected))
}

pub(crate) fn digests_match(actual: &str, expected: &str) -> bool {
    actual.eq_ignore_ascii_case(expected.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_SHA256: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    #[test]
    fn sha256_path_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = sha256_path(f.path()).unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_path_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        assert_eq!(sha256_path(f.path()).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn sha256_spans_multiple_chunks() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        let body: Vec<u8> = (0u8..=250).cycle().take(BUF_SIZE * 3 + 17).collect();
        f.write_all(&body).unwrap();
        f.flush().unwrap();
        let expected = hex::encode(Sha256::digest(&body));
        assert_eq!(sha256_path(f.path()).unwrap(), expected);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = sha256_path(&dir.path().join("absent.zip")).unwrap_err();
        assert!(matches!(err, MirrorError::NotFound { .. }));
    }

    #[test]
    fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = sha256_path(dir.path()).unwrap_err();
        assert!(matches!(err, MirrorError::NotFound { .. }));
    }

    #[test]
    fn verify_ignores_hex_case() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        assert!(verify(f.path(), HELLO_SHA256).unwrap());
        assert!(verify(f.path(), &HELLO_SHA256.to_uppercase()).unwrap());
        assert!(!verify(f.path(), "00").unwrap());
    }
}
