//! Changelog lookup for release items.
//!
//! Changelogs are Markdown files named after the version they describe,
//! optionally prefixed with a configured prefix or the product name.

use std::path::{Path, PathBuf};

/// File names tried for `version`, most specific naming last.
pub fn candidate_names(version: &str, prefix: Option<&str>, product: Option<&str>) -> Vec<String> {
    let file_name = format!("{version}.md");
    let mut names = vec![file_name.clone()];
    for extra in [prefix, product].into_iter().flatten() {
        let extra = extra.trim();
        if extra.is_empty() {
            continue;
        }
        names.push(format!("{extra} {file_name}"));
        names.push(format!("{extra}{file_name}"));
    }
    names
}

/// The first changelog in `dir` that exists for `version`.
pub fn find_changelog(
    dir: &Path,
    version: &str,
    prefix: Option<&str>,
    product: Option<&str>,
) -> Option<PathBuf> {
    candidate_names(version, prefix, product)
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Link to a changelog file under `base_url`. The file name is URL-escaped.
pub fn release_notes_link(base_url: &str, file_name: &str) -> String {
    let base = base_url.trim();
    let name = urlencoding::encode(file_name);
    if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}
