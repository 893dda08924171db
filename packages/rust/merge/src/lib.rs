//! Folder concatenation into a single Markdown-delimited text file.
//!
//! Every regular file directly inside a folder is appended, in file-name
//! order, as:
//!
//! ```text
//! **<file name>**
//!
//! <content, trailing newlines removed>
//!
//! ---
//!
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use hostfilter_shared::{HostFilterError, Result, write_atomic};

/// Separator written after each file's content.
const FILE_SEPARATOR: &str = "\n\n---\n\n";

/// Options for [`merge_folder`].
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Folder whose files are concatenated.
    pub source_dir: PathBuf,
    /// Destination file.
    pub output: PathBuf,
}

/// Summary of a merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub output: PathBuf,
    /// Files appended to the output.
    pub files_merged: usize,
    /// Entries ignored (directories, the output itself, non-regular files).
    pub skipped: usize,
    pub bytes_written: usize,
}

/// Concatenate every file in `config.source_dir` into `config.output`.
#[instrument(skip_all, fields(source = %config.source_dir.display(), output = %config.output.display()))]
pub fn merge_folder(config: &MergeConfig) -> Result<MergeReport> {
    let source = &config.source_dir;
    if !source.is_dir() {
        return Err(HostFilterError::validation(format!(
            "'{}' is not a directory",
            source.display()
        )));
    }

    let output_identity = canonical_target(&config.output);
    let mut merged = String::new();
    let mut files_merged = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| HostFilterError::io(source, e.into()))?;
        let path = entry.path();

        if !path.is_file() {
            debug!(path = %path.display(), "skipping non-file entry");
            skipped += 1;
            continue;
        }

        if output_identity.is_some() && canonical_target(path) == output_identity {
            warn!(path = %path.display(), "skipping output file found in source folder");
            skipped += 1;
            continue;
        }

        let bytes = std::fs::read(path).map_err(|e| HostFilterError::io(path, e))?;
        let name = entry.file_name().to_string_lossy();

        append_file(&mut merged, &name, &bytes);
        files_merged += 1;
        debug!(file = %name, size = bytes.len(), "appended file");
    }

    write_atomic(&config.output, merged.as_bytes())?;

    info!(files_merged, skipped, bytes = merged.len(), "merge complete");

    Ok(MergeReport {
        output: config.output.clone(),
        files_merged,
        skipped,
        bytes_written: merged.len(),
    })
}

/// Append one file block to `out`.
fn append_file(out: &mut String, name: &str, bytes: &[u8]) {
    out.push_str("**");
    out.push_str(name);
    out.push_str("**\n\n");
    out.push_str(normalize_content(bytes).trim_end_matches('\n'));
    out.push_str(FILE_SEPARATOR);
}

/// Decode as UTF-8, dropping invalid sequences, with `\r\n` and `\r` read as `\n`.
fn normalize_content(bytes: &[u8]) -> String {
    let text: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text
    }
}

/// Resolve a path for identity comparison, even if the file does not exist yet.
fn canonical_target(path: &Path) -> Option<PathBuf> {
    if let Ok(p) = path.canonicalize() {
        return Some(p);
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Some(parent.canonicalize().ok()?.join(path.file_name()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hf-merge-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn merges_files_in_name_order() {
        let tmp = temp_dir();
        let src = tmp.join("src");
        std::fs::create_dir_all(src.join("subdir")).unwrap();
        std::fs::write(src.join("b.txt"), "second\n\n\n").unwrap();
        std::fs::write(src.join("a.md"), "# first\nline two").unwrap();
        std::fs::write(src.join("subdir").join("nested.txt"), "ignored").unwrap();

        let output = tmp.join("merged_file.txt");
        let report = merge_folder(&MergeConfig {
            source_dir: src,
            output: output.clone(),
        })
        .unwrap();

        assert_eq!(report.files_merged, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "**a.md**\n\n# first\nline two\n\n---\n\n**b.txt**\n\nsecond\n\n---\n\n"
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn invalid_utf8_is_dropped_and_crlf_normalized() {
        let mut out = String::new();
        append_file(&mut out, "log.txt", b"ok\xff\xfe here\r\nnext\r\n");
        assert_eq!(out, "**log.txt**\n\nok here\nnext\n\n---\n\n");
    }

    #[test]
    fn empty_folder_gives_empty_output() {
        let tmp = temp_dir();
        let src = tmp.join("empty");
        std::fs::create_dir_all(&src).unwrap();
        let output = tmp.join("out.txt");

        let report = merge_folder(&MergeConfig {
            source_dir: src,
            output: output.clone(),
        })
        .unwrap();

        assert_eq!(report.files_merged, 0);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn output_inside_source_is_not_merged_into_itself() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("notes.txt"), "hello").unwrap();
        let output = tmp.join("merged_file.txt");
        std::fs::write(&output, "stale output from a previous run").unwrap();

        let report = merge_folder(&MergeConfig {
            source_dir: tmp.clone(),
            output: output.clone(),
        })
        .unwrap();

        assert_eq!(report.files_merged, 1);
        let merged = std::fs::read_to_string(&output).unwrap();
        assert!(!merged.contains("stale output"));
        assert!(merged.starts_with("**notes.txt**"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_source_is_validation_error() {
        let tmp = temp_dir();
        let err = merge_folder(&MergeConfig {
            source_dir: tmp.join("nope"),
            output: tmp.join("out.txt"),
        })
        .unwrap_err();
        assert!(matches!(err, HostFilterError::Validation { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
