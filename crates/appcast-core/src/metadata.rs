//! Authoritative version metadata read from binaries.

use std::path::Path;

/// Reads a version embedded in a binary (resources, bundle plist, ...).
///
/// The builder uses this instead of the file name when
/// `file_extract_version` is off.
pub trait VersionReader {
    /// The embedded version of the file at `path`, if it has one.
    fn read_version(&self, path: &Path) -> Option<String>;
}

impl<F> VersionReader for F
where
    F: Fn(&Path) -> Option<String>,
{
    fn read_version(&self, path: &Path) -> Option<String> {
        self(path)
    }
}

/// A reader that never finds metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVersionMetadata;

impl VersionReader for NoVersionMetadata {
    fn read_version(&self, _path: &Path) -> Option<String> {
        None
    }
}
