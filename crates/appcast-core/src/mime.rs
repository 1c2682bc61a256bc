//! MIME types for release artifacts.

use appcast_schema::DEFAULT_MIME_TYPE;
use std::path::Path;

// Longest suffix first so `.tar.gz` wins over `.gz`
const TYPES: &[(&str, &str)] = &[
    (".tar.gz", "application/gzip"),
    (".tgz", "application/gzip"),
    (".tar.xz", "application/x-xz"),
    (".appimage", "application/vnd.appimage"),
    (".msix", "application/msix"),
    (".json", "application/json"),
    (".toml", "application/toml"),
    (".html", "text/html"),
    (".pdf", "application/pdf"),
    (".zip", "application/zip"),
    (".tar", "application/x-tar"),
    (".exe", "application/vnd.microsoft.portable-executable"),
    (".dll", "application/vnd.microsoft.portable-executable"),
    (".msi", "application/x-msi"),
    (".dmg", "application/x-apple-diskimage"),
    (".pkg", "application/vnd.apple.installer+xml"),
    (".deb", "application/vnd.debian.binary-package"),
    (".rpm", "application/x-rpm"),
    (".txt", "text/plain"),
    (".md", "text/markdown"),
    (".gz", "application/gzip"),
    (".xz", "application/x-xz"),
    (".7z", "application/x-7z-compressed"),
];

/// MIME type for `path` by extension, or [`DEFAULT_MIME_TYPE`].
pub fn mime_type_for(path: &Path) -> &'static str {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return DEFAULT_MIME_TYPE;
    };
    let name = name.to_lowercase();
    TYPES
        .iter()
        .find(|(ext, _)| name.ends_with(*ext))
        .map_or(DEFAULT_MIME_TYPE, |&(_, mime)| mime)
}
