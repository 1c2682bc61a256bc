//! Build failures and non-fatal build notices.

use std::path::PathBuf;

use crate::serializer::ManifestError;
use crate::signing::SigningError;

/// Errors that abort a manifest build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No binaries found in {dir} (extensions: {extensions})")]
    NoBinariesFound { dir: PathBuf, extensions: String },

    #[error("Invalid operating system: {0} (expected a tag containing windows, mac or linux)")]
    InvalidOperatingSystem(String),

    #[error(
        "Override version {version} would apply to more than one binary ({path}); set file_version on a single-file build only"
    )]
    AmbiguousOverrideVersion { version: String, path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serializer(#[from] ManifestError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Conditions worth reporting that do not stop a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildNotice {
    /// No version could be determined for a binary; it was skipped.
    VersionResolutionFailed { path: PathBuf },
    /// A changelog directory was configured but held no file for a version.
    ChangelogNotFound { version: String },
    /// An existing item already had this version and was kept.
    DuplicateSkipped { version: String, path: PathBuf },
    /// An existing item with this version was replaced.
    DuplicateReplaced { version: String, path: PathBuf },
}

impl std::fmt::Display for BuildNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VersionResolutionFailed { path } => {
                write!(f, "No version found for {}; skipped", path.display())
            }
            Self::ChangelogNotFound { version } => {
                write!(f, "No changelog found for version {version}")
            }
            Self::DuplicateSkipped { version, path } => write!(
                f,
                "Version {version} already in manifest; kept existing item ({})",
                path.display()
            ),
            Self::DuplicateReplaced { version, path } => write!(
                f,
                "Version {version} already in manifest; replaced with {}",
                path.display()
            ),
        }
    }
}
