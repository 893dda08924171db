//! All-or-nothing file output.

use std::path::Path;

use tracing::debug;

use crate::error::{HostFilterError, Result};

/// Write `contents` to `path` atomically: write a hidden sibling temp file,
/// then rename it over the destination.
///
/// Parent directories are created as needed. On failure the temp file is
/// removed and the destination is left untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| HostFilterError::validation(format!("not a file path: {}", path.display())))?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    std::fs::create_dir_all(&parent).map_err(|e| HostFilterError::write(path, e))?;

    let temp = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

    if let Err(e) = std::fs::write(&temp, contents) {
        let _ = std::fs::remove_file(&temp);
        return Err(HostFilterError::write(path, e));
    }

    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(HostFilterError::write(path, e));
    }

    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}
