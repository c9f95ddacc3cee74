//! Archive file name derivation from a source URL.

use crate::error::{MirrorError, MirrorResult};

/// Returns the last non-empty path segment of `url`, used as the cached
/// archive's file name. Query and fragment are ignored.
pub fn archive_file_name(url: &str) -> MirrorResult<String> {
    let invalid = |reason| MirrorError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = url::Url::parse(url).map_err(|_| invalid("not a valid url"))?;
    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(|| invalid("path has no file name"))?;
    if segment == "." || segment == ".." {
        return Err(invalid("path has no file name"));
    }
    Ok(segment.to_string())
}
