//! Release binary discovery.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Parse a comma-separated extension list (`"exe, msi"`).
///
/// Entries are trimmed and stripped of a leading dot; blanks and repeats
/// are dropped and the first-seen order kept.
pub fn extensions_from_str(list: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ext in list.split(',') {
        let ext = ext.trim().trim_start_matches('.');
        if !ext.is_empty() && !out.iter().any(|e| e == ext) {
            out.push(ext.to_string());
        }
    }
    out
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_lowercase();
    extensions
        .iter()
        .any(|ext| name.ends_with(&format!(".{}", ext.trim_start_matches('.').to_lowercase())))
}

/// Find files in `dir` whose names end with one of `extensions`.
///
/// Matching is case-insensitive, so a compound extension such as `tar.gz`
/// works. Symlinks to regular files count as binaries. Only `dir` itself is
/// searched unless `recursive` is set. Results are sorted and contain each
/// path once.
///
/// # Errors
///
/// Returns an error if `dir` or one of its subdirectories cannot be read.
pub fn find_binaries(
    dir: &Path,
    extensions: &[String],
    recursive: bool,
) -> std::io::Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !has_extension(entry.path(), extensions) {
            continue;
        }
        // Symlinks are kept when they resolve to a regular file
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file {
            found.push(entry.into_path());
        } else if entry.path_is_symlink() {
            tracing::warn!(path = %entry.path().display(), "Skipping link that is not a file");
        }
    }
    found.sort();
    found.dedup();
    Ok(found)
}
